//! Issuer side: encrypt, wrap, sign
//!
//! A fresh AES-128 key and IV are drawn for every call. The key leaves this
//! function only wrapped for the recipient.

use sello_crypto::{cipher, KeyWrapper, MessageSigner};
use sello_envelope::Envelope;
use tracing::{debug, info};

use crate::blocks::{CIPHERTEXT, ISSUER_SIGNATURE, IV, WRAPPED_KEY};
use crate::signed_range::{signed_message, SigningStage};
use crate::{ProtocolError, Result};

/// Builds issuer-signed envelopes
pub struct Packager<W, S> {
    recipient: W,
    issuer: S,
}

impl<W: KeyWrapper, S: MessageSigner> Packager<W, S> {
    /// `recipient` wraps session keys, `issuer` signs
    pub fn new(recipient: W, issuer: S) -> Self {
        Self { recipient, issuer }
    }

    /// Encrypt `payload` into a new issuer-signed envelope
    pub fn package(&self, payload: &[u8]) -> Result<Envelope> {
        let key = cipher::generate_key().map_err(ProtocolError::Crypto)?;
        let iv = cipher::generate_iv().map_err(ProtocolError::Crypto)?;

        let ciphertext = cipher::encrypt(&key[..], &iv, payload).map_err(ProtocolError::Crypto)?;
        debug!(plaintext = payload.len(), ciphertext = ciphertext.len(), "payload encrypted");

        let wrapped_key = self
            .recipient
            .wrap_key(&key[..])
            .map_err(ProtocolError::Crypto)?;
        debug!(wrapped = wrapped_key.len(), "session key wrapped");

        let mut envelope = Envelope::new();
        envelope.add_block(CIPHERTEXT, ciphertext)?;
        envelope.add_block(WRAPPED_KEY, wrapped_key)?;
        envelope.add_block(IV, iv.to_vec())?;

        let message = signed_message(&envelope, SigningStage::Issuer)?;
        let signature = self.issuer.sign(&message).map_err(ProtocolError::Crypto)?;
        envelope.add_block(ISSUER_SIGNATURE, signature)?;

        info!(blocks = envelope.len(), "envelope packaged and signed by issuer");
        Ok(envelope)
    }
}
