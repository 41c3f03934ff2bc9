//! Authority side: verify the issuer, timestamp, counter-sign
//!
//! The issuer signature is checked before a timestamp is even generated, so
//! a forged or corrupted envelope never receives an official time.

use sello_crypto::{MessageSigner, MessageVerifier};
use sello_envelope::Envelope;
use tracing::{debug, info, warn};

use crate::blocks::{self, AUTHORITY_SIGNATURE, SEALER_INPUT, TIMESTAMP};
use crate::clock::{format_timestamp, Clock, SystemClock};
use crate::signed_range::{signed_message, SigningStage};
use crate::{ProtocolError, Result};

/// A freshly sealed envelope and the time it was sealed at
#[derive(Debug, Clone)]
pub struct Sealed {
    pub envelope: Envelope,
    pub timestamp: String,
}

/// Seals issuer-signed envelopes
pub struct Sealer<V, S, C = SystemClock> {
    issuer: V,
    authority: S,
    clock: C,
}

impl<V: MessageVerifier, S: MessageSigner> Sealer<V, S> {
    /// `issuer` verifies the incoming signature, `authority` counter-signs
    pub fn new(issuer: V, authority: S) -> Self {
        Self {
            issuer,
            authority,
            clock: SystemClock,
        }
    }
}

impl<V: MessageVerifier, S: MessageSigner, C: Clock> Sealer<V, S, C> {
    /// Replace the time source
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Sealer<V, S, C2> {
        Sealer {
            issuer: self.issuer,
            authority: self.authority,
            clock,
        }
    }

    /// Seal `envelope`, consuming it.
    ///
    /// On any error the envelope is dropped: the caller still has the file
    /// it was loaded from, untouched.
    pub fn seal(&self, mut envelope: Envelope) -> Result<Sealed> {
        // A stray TIMESTAMP means someone started sealing; treat it as done.
        if envelope.contains(AUTHORITY_SIGNATURE) || envelope.contains(TIMESTAMP) {
            warn!("refusing to seal an envelope that already carries a seal");
            return Err(ProtocolError::AlreadySealed);
        }
        blocks::require(&envelope, &SEALER_INPUT)?;

        let issuer_message = signed_message(&envelope, SigningStage::Issuer)?;
        let issuer_signature = blocks::get(&envelope, SigningStage::Issuer.signature_block())?;
        if self.issuer.verify(&issuer_message, issuer_signature).is_err() {
            warn!("issuer signature rejected, envelope not sealed");
            return Err(ProtocolError::IssuerVerificationFailed);
        }
        debug!("issuer signature verified");

        let timestamp = format_timestamp(self.clock.now());
        envelope.add_block(TIMESTAMP, timestamp.as_bytes().to_vec())?;

        let authority_message = signed_message(&envelope, SigningStage::Authority)?;
        let authority_signature = self
            .authority
            .sign(&authority_message)
            .map_err(ProtocolError::Crypto)?;
        envelope.add_block(AUTHORITY_SIGNATURE, authority_signature)?;

        info!(%timestamp, "envelope sealed by authority");
        Ok(Sealed {
            envelope,
            timestamp,
        })
    }
}
