//! Signing and verification capabilities
//!
//! Both the issuer and the authority sign with RSASSA-PKCS1-v1_5 over a
//! SHA-512 digest. The message handed to these objects is the exact byte
//! concatenation the protocol defines; nothing is added or framed here.

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha512;

use crate::{CryptoError, PrivateKey, PublicKey, Result};

/// Produces a detached signature over a message
pub trait MessageSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Checks a detached signature over a message
pub trait MessageVerifier {
    /// `Ok(())` only for a valid signature; any other outcome is
    /// [`CryptoError::SignatureInvalid`].
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()>;
}

impl<T: MessageSigner + ?Sized> MessageSigner for &T {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(message)
    }
}

impl<T: MessageVerifier + ?Sized> MessageVerifier for &T {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        (**self).verify(message, signature)
    }
}

/// SHA512withRSA signer
pub struct RsaSha512Signer {
    key: SigningKey<Sha512>,
}

impl RsaSha512Signer {
    pub fn new(key: PrivateKey) -> Self {
        Self {
            key: SigningKey::new(key.as_rsa().clone()),
        }
    }
}

impl MessageSigner for RsaSha512Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .key
            .try_sign(message)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }
}

/// SHA512withRSA verifier
pub struct RsaSha512Verifier {
    key: VerifyingKey<Sha512>,
}

impl RsaSha512Verifier {
    pub fn new(key: PublicKey) -> Self {
        Self {
            key: VerifyingKey::new(key.as_rsa().clone()),
        }
    }
}

impl MessageVerifier for RsaSha512Verifier {
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let signature =
            Signature::try_from(signature).map_err(|_| CryptoError::SignatureInvalid)?;
        self.key
            .verify(message, &signature)
            .map_err(|_| CryptoError::SignatureInvalid)
    }
}
