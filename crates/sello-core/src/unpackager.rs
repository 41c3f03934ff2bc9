//! Recipient side: verify authority, verify issuer, unwrap, decrypt
//!
//! ```text
//! Start -> Complete -> AuthorityVerified -> IssuerVerified -> KeyUnwrapped -> Decrypted -> Done
//!   \________\_____________\__________________\________________\____________\-> Rejected
//! ```
//!
//! Each state is its own type and each transition consumes the previous
//! state. The only way to obtain a `KeyUnwrapped` is from `IssuerVerified`,
//! which only comes from `AuthorityVerified`: the recipient key is never
//! touched, and nothing is decrypted, unless both signatures check out.

use std::fmt;

use sello_crypto::{cipher, KeyUnwrapper, MessageVerifier};
use sello_envelope::Envelope;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::blocks::{self, CIPHERTEXT, IV, SEALED, TIMESTAMP, WRAPPED_KEY};
use crate::signed_range::{signed_message, SigningStage};
use crate::{ProtocolError, Result};

/// Position in the verification chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackState {
    Start,
    Complete,
    AuthorityVerified,
    IssuerVerified,
    KeyUnwrapped,
    Decrypted,
    Done,
    Rejected,
}

impl fmt::Display for UnpackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::AuthorityVerified => "authority-verified",
            Self::IssuerVerified => "issuer-verified",
            Self::KeyUnwrapped => "key-unwrapped",
            Self::Decrypted => "decrypted",
            Self::Done => "done",
            Self::Rejected => "rejected",
        })
    }
}

/// Emitted on every transition, for progress reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnpackEvent {
    /// Every block is present; no cryptography has run yet
    Complete,
    /// Authority signature valid; the timestamp can now be trusted
    AuthorityVerified { timestamp: String },
    /// Issuer signature valid
    IssuerVerified,
    /// Session key recovered with the recipient key
    KeyUnwrapped,
    /// Payload decrypted
    Decrypted { bytes: usize },
    /// Plaintext and timestamp released to the caller
    Done,
    /// Pipeline stopped; `at` is the last state reached
    Rejected { at: UnpackState, reason: String },
}

impl UnpackEvent {
    /// The state this event moves the machine into
    pub fn state(&self) -> UnpackState {
        match self {
            Self::Complete => UnpackState::Complete,
            Self::AuthorityVerified { .. } => UnpackState::AuthorityVerified,
            Self::IssuerVerified => UnpackState::IssuerVerified,
            Self::KeyUnwrapped => UnpackState::KeyUnwrapped,
            Self::Decrypted { .. } => UnpackState::Decrypted,
            Self::Done => UnpackState::Done,
            Self::Rejected { .. } => UnpackState::Rejected,
        }
    }
}

/// Plaintext released after a fully verified unpack
pub struct Unpacked {
    pub payload: Zeroizing<Vec<u8>>,
    pub timestamp: String,
}

impl fmt::Debug for Unpacked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unpacked")
            .field("payload_len", &self.payload.len())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

struct Complete<'e> {
    envelope: &'e Envelope,
}

struct AuthorityVerified<'e> {
    envelope: &'e Envelope,
    timestamp: String,
}

struct IssuerVerified<'e> {
    envelope: &'e Envelope,
    timestamp: String,
}

struct KeyUnwrapped<'e> {
    envelope: &'e Envelope,
    timestamp: String,
    key: Zeroizing<Vec<u8>>,
}

struct Decrypted {
    payload: Zeroizing<Vec<u8>>,
    timestamp: String,
}

fn verify_stage(envelope: &Envelope, stage: SigningStage, verifier: &impl MessageVerifier) -> bool {
    let Ok(message) = signed_message(envelope, stage) else {
        return false;
    };
    let Some(signature) = envelope.block(stage.signature_block()) else {
        return false;
    };
    verifier.verify(&message, signature).is_ok()
}

impl<'e> Complete<'e> {
    /// All six blocks, checked before any cryptography runs
    fn check_complete(envelope: &'e Envelope) -> Result<Self> {
        blocks::require(envelope, &SEALED)?;
        Ok(Self { envelope })
    }

    fn verify_authority(self, authority: &impl MessageVerifier) -> Result<AuthorityVerified<'e>> {
        if !verify_stage(self.envelope, SigningStage::Authority, authority) {
            return Err(ProtocolError::AuthorityVerificationFailed);
        }
        let timestamp =
            String::from_utf8_lossy(blocks::get(self.envelope, TIMESTAMP)?).into_owned();
        Ok(AuthorityVerified {
            envelope: self.envelope,
            timestamp,
        })
    }
}

impl<'e> AuthorityVerified<'e> {
    fn verify_issuer(self, issuer: &impl MessageVerifier) -> Result<IssuerVerified<'e>> {
        if !verify_stage(self.envelope, SigningStage::Issuer, issuer) {
            return Err(ProtocolError::IssuerVerificationFailed);
        }
        Ok(IssuerVerified {
            envelope: self.envelope,
            timestamp: self.timestamp,
        })
    }
}

impl<'e> IssuerVerified<'e> {
    fn unwrap_key(self, recipient: &impl KeyUnwrapper) -> Result<KeyUnwrapped<'e>> {
        let wrapped = blocks::get(self.envelope, WRAPPED_KEY)?;
        let key = recipient
            .unwrap_key(wrapped)
            .map_err(|_| ProtocolError::KeyUnwrapFailed)?;
        if key.len() != cipher::KEY_SIZE {
            return Err(ProtocolError::KeyUnwrapFailed);
        }
        Ok(KeyUnwrapped {
            envelope: self.envelope,
            timestamp: self.timestamp,
            key,
        })
    }
}

impl KeyUnwrapped<'_> {
    fn decrypt(self) -> Result<Decrypted> {
        let iv = blocks::get(self.envelope, IV)?;
        let ciphertext = blocks::get(self.envelope, CIPHERTEXT)?;
        let payload = cipher::decrypt(&self.key, iv, ciphertext)
            .map_err(|_| ProtocolError::DecryptionFailed)?;
        Ok(Decrypted {
            payload,
            timestamp: self.timestamp,
        })
    }
}

impl Decrypted {
    fn finish(self) -> Unpacked {
        Unpacked {
            payload: self.payload,
            timestamp: self.timestamp,
        }
    }
}

/// Opens sealed envelopes, fail-closed
pub struct Unpackager<U, V, A> {
    recipient: U,
    issuer: V,
    authority: A,
}

impl<U: KeyUnwrapper, V: MessageVerifier, A: MessageVerifier> Unpackager<U, V, A> {
    /// `recipient` unwraps, `issuer` and `authority` verify their signatures
    pub fn new(recipient: U, issuer: V, authority: A) -> Self {
        Self {
            recipient,
            issuer,
            authority,
        }
    }

    /// Verify and decrypt a sealed envelope
    pub fn unpack(&self, envelope: &Envelope) -> Result<Unpacked> {
        self.unpack_with(envelope, |_| {})
    }

    /// Like [`unpack`](Self::unpack), reporting each transition to `on_event`
    pub fn unpack_with<F>(&self, envelope: &Envelope, mut on_event: F) -> Result<Unpacked>
    where
        F: FnMut(UnpackEvent),
    {
        let mut reached = UnpackState::Start;
        let mut emit = |event: UnpackEvent| {
            reached = event.state();
            debug!(state = %reached, "unpack transition");
            on_event(event);
        };

        match self.run(envelope, &mut emit) {
            Ok(unpacked) => {
                info!(
                    timestamp = %unpacked.timestamp,
                    bytes = unpacked.payload.len(),
                    "envelope unpacked"
                );
                Ok(unpacked)
            }
            Err(error) => {
                warn!(at = %reached, %error, "envelope rejected");
                on_event(UnpackEvent::Rejected {
                    at: reached,
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }

    fn run(&self, envelope: &Envelope, emit: &mut impl FnMut(UnpackEvent)) -> Result<Unpacked> {
        let complete = Complete::check_complete(envelope)?;
        emit(UnpackEvent::Complete);

        let verified = complete.verify_authority(&self.authority)?;
        emit(UnpackEvent::AuthorityVerified {
            timestamp: verified.timestamp.clone(),
        });

        let verified = verified.verify_issuer(&self.issuer)?;
        emit(UnpackEvent::IssuerVerified);

        let unwrapped = verified.unwrap_key(&self.recipient)?;
        emit(UnpackEvent::KeyUnwrapped);

        let decrypted = unwrapped.decrypt()?;
        emit(UnpackEvent::Decrypted {
            bytes: decrypted.payload.len(),
        });

        let unpacked = decrypted.finish();
        emit(UnpackEvent::Done);
        Ok(unpacked)
    }
}
