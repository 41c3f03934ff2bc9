//! Sello Crypto - primitives for sealed-invoice envelopes
//!
//! This crate provides:
//! - AES-128-CBC session cipher with fresh key and IV per payload
//! - RSA-OAEP wrapping of the session key for the recipient
//! - RSASSA-PKCS1-v1_5 / SHA-512 signatures for issuer and authority
//! - Key loading from SPKI / PKCS#8 files (DER, or PEM as a convenience)
//!
//! Pipelines never touch the algorithms directly. They receive capability
//! objects (`MessageSigner`, `MessageVerifier`, `KeyWrapper`, `KeyUnwrapper`)
//! so the algorithm choice is made by whoever constructs them.

pub mod cipher;
pub mod keys;
pub mod sign;
pub mod wrap;

pub use keys::{PrivateKey, PublicKey};
pub use sign::{MessageSigner, MessageVerifier, RsaSha512Signer, RsaSha512Verifier};
pub use wrap::{KeyUnwrapper, KeyWrapper, RsaOaepUnwrapper, RsaOaepWrapper};

use std::path::PathBuf;

/// Errors that can occur in cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed or unsupported key material: {0}")]
    KeyLoad(String),

    #[error("Random number generator failure")]
    Random,

    #[error("Invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("Invalid IV size: expected {expected}, got {actual}")]
    InvalidIvSize { expected: usize, actual: usize },

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed - data may be corrupted or the key is wrong")]
    Decryption,

    #[error("Key wrapping failed: {0}")]
    Wrap(String),

    #[error("Key unwrapping failed")]
    Unwrap,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Signature verification failed")]
    SignatureInvalid,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
