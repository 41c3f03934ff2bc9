//! What exactly each signature covers
//!
//! A signature is computed over the plain concatenation of the contents of
//! an ordered list of blocks: no separators, no length prefixes. The
//! authority range extends the issuer range, which binds the timestamp to
//! the exact content the issuer signed.
//!
//! Every sign and verify call site builds its message through
//! [`signed_message`], so the signing and verifying sides cannot drift
//! apart.

use sello_envelope::Envelope;

use crate::blocks::{
    self, AUTHORITY_SIGNATURE, CIPHERTEXT, ISSUER_SIGNATURE, TIMESTAMP, WRAPPED_KEY,
};
use crate::Result;

const ISSUER_RANGE: [&str; 2] = [CIPHERTEXT, WRAPPED_KEY];
const AUTHORITY_RANGE: [&str; 3] = [CIPHERTEXT, WRAPPED_KEY, TIMESTAMP];

/// The two signing parties, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    Issuer,
    Authority,
}

impl SigningStage {
    /// Block that carries this stage's signature
    pub fn signature_block(self) -> &'static str {
        match self {
            Self::Issuer => ISSUER_SIGNATURE,
            Self::Authority => AUTHORITY_SIGNATURE,
        }
    }
}

/// Ordered block names whose contents form the signed message
pub fn signed_range(stage: SigningStage) -> &'static [&'static str] {
    match stage {
        SigningStage::Issuer => &ISSUER_RANGE,
        SigningStage::Authority => &AUTHORITY_RANGE,
    }
}

/// The exact bytes signed (or to be verified) for `stage`
pub fn signed_message(envelope: &Envelope, stage: SigningStage) -> Result<Vec<u8>> {
    let range = signed_range(stage);
    blocks::require(envelope, range)?;

    let mut message = Vec::new();
    for &name in range {
        message.extend_from_slice(blocks::get(envelope, name)?);
    }
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::IV;
    use crate::ProtocolError;

    fn envelope() -> Envelope {
        let mut env = Envelope::new();
        env.add_block(CIPHERTEXT, b"CT".to_vec()).unwrap();
        env.add_block(IV, b"iv".to_vec()).unwrap();
        env.add_block(WRAPPED_KEY, b"WK".to_vec()).unwrap();
        env.add_block(ISSUER_SIGNATURE, b"is".to_vec()).unwrap();
        env
    }

    #[test]
    fn test_ranges() {
        assert_eq!(signed_range(SigningStage::Issuer), ["CIPHERTEXT", "WRAPPED_KEY"]);
        assert_eq!(
            signed_range(SigningStage::Authority),
            ["CIPHERTEXT", "WRAPPED_KEY", "TIMESTAMP"]
        );
    }

    #[test]
    fn test_authority_range_extends_issuer_range() {
        let issuer = signed_range(SigningStage::Issuer);
        let authority = signed_range(SigningStage::Authority);
        assert_eq!(&authority[..issuer.len()], issuer);
    }

    #[test]
    fn test_message_follows_range_order_not_insertion_order() {
        let mut env = envelope();
        assert_eq!(signed_message(&env, SigningStage::Issuer).unwrap(), b"CTWK");

        env.add_block(TIMESTAMP, b"2026".to_vec()).unwrap();
        assert_eq!(signed_message(&env, SigningStage::Authority).unwrap(), b"CTWK2026");
    }

    #[test]
    fn test_signatures_and_iv_are_not_covered() {
        for stage in [SigningStage::Issuer, SigningStage::Authority] {
            let range = signed_range(stage);
            assert!(!range.contains(&IV));
            assert!(!range.contains(&stage.signature_block()));
        }
    }

    #[test]
    fn test_missing_block_reported() {
        let err = signed_message(&envelope(), SigningStage::Authority).unwrap_err();
        assert!(matches!(err, ProtocolError::IncompleteEnvelope(m) if m == vec![TIMESTAMP]));
    }

    #[test]
    fn test_signature_blocks() {
        assert_eq!(SigningStage::Issuer.signature_block(), "ISSUER_SIGNATURE");
        assert_eq!(SigningStage::Authority.signature_block(), "AUTHORITY_SIGNATURE");
    }
}
