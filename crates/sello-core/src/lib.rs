//! Sello Core - the sealed-invoice envelope protocol
//!
//! Three pipelines share one artifact, the [`Envelope`]:
//!
//! - [`Packager`]: issuer encrypts the invoice, wraps the session key for
//!   the recipient and signs `CIPHERTEXT || WRAPPED_KEY`
//! - [`Sealer`]: authority checks the issuer signature, adds a timestamp and
//!   counter-signs `CIPHERTEXT || WRAPPED_KEY || TIMESTAMP`
//! - [`Unpackager`]: recipient verifies authority, then issuer, and only then
//!   unwraps the key and decrypts
//!
//! Each pipeline receives its keys as capability objects from
//! `sello_crypto`, never from ambient state.

pub mod blocks;
pub mod clock;
pub mod packager;
pub mod sealer;
pub mod signed_range;
pub mod unpackager;

pub use blocks::EnvelopeState;
pub use clock::{Clock, FixedClock, SystemClock};
pub use packager::Packager;
pub use sealer::{Sealed, Sealer};
pub use sello_envelope::Envelope;
pub use signed_range::{signed_message, signed_range, SigningStage};
pub use unpackager::{UnpackEvent, UnpackState, Unpacked, Unpackager};

use sello_crypto::CryptoError;
use sello_envelope::ContainerError;

/// Why a pipeline stage refused to produce output
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Envelope is incomplete, missing block(s): {}", .0.join(", "))]
    IncompleteEnvelope(Vec<&'static str>),

    #[error("Envelope has already been sealed")]
    AlreadySealed,

    #[error("Authority signature is INVALID: the timestamp or the sealed content was altered")]
    AuthorityVerificationFailed,

    #[error(
        "Issuer signature is INVALID: the envelope was not produced by this issuer or was modified"
    )]
    IssuerVerificationFailed,

    #[error("Could not unwrap the session key with the recipient private key")]
    KeyUnwrapFailed,

    #[error("Could not decrypt the payload: padding or key mismatch")]
    DecryptionFailed,

    #[error("Cryptographic operation failed: {0}")]
    Crypto(#[source] CryptoError),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
