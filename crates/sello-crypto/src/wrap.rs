//! Session-key wrapping for the recipient
//!
//! RSA-OAEP with SHA-256 for both the label hash and MGF1. Textbook RSA and
//! PKCS#1 v1.5 encryption are not offered.

use rand::rngs::OsRng;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{CryptoError, PrivateKey, PublicKey, Result};

/// Encrypts a symmetric key for a recipient
pub trait KeyWrapper {
    fn wrap_key(&self, key: &[u8]) -> Result<Vec<u8>>;
}

/// Recovers a symmetric key wrapped by the matching [`KeyWrapper`]
pub trait KeyUnwrapper {
    fn unwrap_key(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>>;
}

impl<T: KeyWrapper + ?Sized> KeyWrapper for &T {
    fn wrap_key(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).wrap_key(key)
    }
}

impl<T: KeyUnwrapper + ?Sized> KeyUnwrapper for &T {
    fn unwrap_key(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        (**self).unwrap_key(wrapped)
    }
}

fn padding() -> Oaep {
    Oaep::new::<Sha256>()
}

/// RSA-OAEP wrapper around the recipient's public key
pub struct RsaOaepWrapper {
    key: PublicKey,
}

impl RsaOaepWrapper {
    pub fn new(key: PublicKey) -> Self {
        Self { key }
    }
}

impl KeyWrapper for RsaOaepWrapper {
    fn wrap_key(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.key
            .as_rsa()
            .encrypt(&mut OsRng, padding(), key)
            .map_err(|e| CryptoError::Wrap(e.to_string()))
    }
}

/// RSA-OAEP unwrapper holding the recipient's private key
pub struct RsaOaepUnwrapper {
    key: PrivateKey,
}

impl RsaOaepUnwrapper {
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }
}

impl KeyUnwrapper for RsaOaepUnwrapper {
    fn unwrap_key(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.key
            .as_rsa()
            .decrypt(padding(), wrapped)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::Unwrap)
    }
}
