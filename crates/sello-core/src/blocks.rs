//! Block names and the envelope states they define

use std::fmt;

use sello_envelope::Envelope;

use crate::{ProtocolError, Result};

pub const CIPHERTEXT: &str = "CIPHERTEXT";
pub const WRAPPED_KEY: &str = "WRAPPED_KEY";
pub const IV: &str = "IV";
pub const ISSUER_SIGNATURE: &str = "ISSUER_SIGNATURE";
pub const TIMESTAMP: &str = "TIMESTAMP";
pub const AUTHORITY_SIGNATURE: &str = "AUTHORITY_SIGNATURE";

/// Blocks written by the Packager
pub const ISSUER_SIGNED: [&str; 4] = [CIPHERTEXT, WRAPPED_KEY, IV, ISSUER_SIGNATURE];

/// Blocks the Sealer needs before it will look at an envelope
pub const SEALER_INPUT: [&str; 3] = [CIPHERTEXT, WRAPPED_KEY, ISSUER_SIGNATURE];

/// Blocks of a fully sealed envelope
pub const SEALED: [&str; 6] = [
    CIPHERTEXT,
    WRAPPED_KEY,
    IV,
    ISSUER_SIGNATURE,
    TIMESTAMP,
    AUTHORITY_SIGNATURE,
];

/// Names from `required` that the envelope lacks, in `required` order
pub fn missing(envelope: &Envelope, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|name| !envelope.contains(name))
        .collect()
}

/// Fail with `IncompleteEnvelope` unless every required block is present
pub fn require(envelope: &Envelope, required: &[&'static str]) -> Result<()> {
    let absent = missing(envelope, required);
    if absent.is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::IncompleteEnvelope(absent))
    }
}

/// Content of a block that must be present
pub fn get<'e>(envelope: &'e Envelope, name: &'static str) -> Result<&'e [u8]> {
    envelope
        .block(name)
        .ok_or_else(|| ProtocolError::IncompleteEnvelope(vec![name]))
}

/// Where an envelope stands in the protocol, judged by block presence only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Neither issuer-signed nor sealed
    Incomplete,
    /// Packaged and signed by the issuer, not yet sealed
    IssuerSigned,
    /// Timestamped and counter-signed by the authority
    Sealed,
}

impl EnvelopeState {
    pub fn of(envelope: &Envelope) -> Self {
        if missing(envelope, &SEALED).is_empty() {
            Self::Sealed
        } else if missing(envelope, &ISSUER_SIGNED).is_empty()
            && !envelope.contains(TIMESTAMP)
            && !envelope.contains(AUTHORITY_SIGNATURE)
        {
            Self::IssuerSigned
        } else {
            Self::Incomplete
        }
    }
}

impl fmt::Display for EnvelopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Incomplete => "incomplete",
            Self::IssuerSigned => "issuer-signed",
            Self::Sealed => "sealed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_blocks(names: &[&str]) -> Envelope {
        let mut env = Envelope::new();
        for name in names {
            env.add_block(*name, name.as_bytes().to_vec()).unwrap();
        }
        env
    }

    #[test]
    fn test_states() {
        assert_eq!(EnvelopeState::of(&Envelope::new()), EnvelopeState::Incomplete);
        assert_eq!(EnvelopeState::of(&with_blocks(&ISSUER_SIGNED)), EnvelopeState::IssuerSigned);
        assert_eq!(EnvelopeState::of(&with_blocks(&SEALED)), EnvelopeState::Sealed);
    }

    #[test]
    fn test_stray_seal_blocks_are_not_issuer_signed() {
        let mut env = with_blocks(&ISSUER_SIGNED);
        env.add_block(AUTHORITY_SIGNATURE, b"sig".to_vec()).unwrap();
        assert_eq!(EnvelopeState::of(&env), EnvelopeState::Incomplete);

        let mut env = with_blocks(&ISSUER_SIGNED);
        env.add_block(TIMESTAMP, b"ts".to_vec()).unwrap();
        assert_eq!(EnvelopeState::of(&env), EnvelopeState::Incomplete);
    }

    #[test]
    fn test_sealed_without_iv_is_incomplete() {
        let env = with_blocks(&[
            CIPHERTEXT,
            WRAPPED_KEY,
            ISSUER_SIGNATURE,
            TIMESTAMP,
            AUTHORITY_SIGNATURE,
        ]);
        assert_eq!(EnvelopeState::of(&env), EnvelopeState::Incomplete);
        assert_eq!(missing(&env, &SEALED), vec![IV]);
    }

    #[test]
    fn test_require_names_every_missing_block() {
        let env = with_blocks(&[WRAPPED_KEY]);
        match require(&env, &SEALER_INPUT) {
            Err(ProtocolError::IncompleteEnvelope(absent)) => {
                assert_eq!(absent, vec![CIPHERTEXT, ISSUER_SIGNATURE]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(EnvelopeState::IssuerSigned.to_string(), "issuer-signed");
    }
}
