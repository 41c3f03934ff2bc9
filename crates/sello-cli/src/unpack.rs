//! `sello-unpack`: recipient side, with a step-by-step verification report

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sello_core::{Envelope, UnpackEvent, UnpackState, Unpackager};
use sello_crypto::{PrivateKey, PublicKey, RsaOaepUnwrapper, RsaSha512Verifier};
use sello_envelope::write_atomic;

#[derive(Debug, Parser)]
#[command(name = "sello-unpack", version)]
#[command(
    about = "Verify authority and issuer signatures, then decrypt the payload",
    long_about = None
)]
pub struct UnpackArgs {
    /// Sealed envelope
    pub envelope: PathBuf,

    /// Where to write the decrypted payload; untouched unless every check passes
    pub output: PathBuf,

    /// Recipient private key (PKCS#8, DER or PEM)
    pub recipient_private_key: PathBuf,

    /// Issuer public key (SubjectPublicKeyInfo, DER or PEM)
    pub issuer_public_key: PathBuf,

    /// Authority public key (SubjectPublicKeyInfo, DER or PEM)
    pub authority_public_key: PathBuf,

    /// Log each step
    #[arg(short, long)]
    pub verbose: bool,
}

const STEP_COMPLETE: &str = "0. Checking envelope completeness...";
const STEP_AUTHORITY: &str = "1. Verifying authority seal...";
const STEP_ISSUER: &str = "2. Verifying issuer signature...";
const STEP_UNWRAP: &str = "3. Unwrapping session key...";
const STEP_DECRYPT: &str = "4. Decrypting payload...";

/// The step that was being attempted when the pipeline stopped at `at`
fn failed_step(at: UnpackState) -> &'static str {
    match at {
        UnpackState::Start => STEP_COMPLETE,
        UnpackState::Complete => STEP_AUTHORITY,
        UnpackState::AuthorityVerified => STEP_ISSUER,
        UnpackState::IssuerVerified => STEP_UNWRAP,
        UnpackState::KeyUnwrapped
        | UnpackState::Decrypted
        | UnpackState::Done
        | UnpackState::Rejected => STEP_DECRYPT,
    }
}

/// Report lines for one pipeline event
pub fn report_lines(event: &UnpackEvent) -> Vec<String> {
    match event {
        UnpackEvent::Complete => vec![format!("{STEP_COMPLETE} OK")],
        UnpackEvent::AuthorityVerified { timestamp } => vec![
            format!("{STEP_AUTHORITY} VALID"),
            format!("   Sealed at {timestamp}"),
        ],
        UnpackEvent::IssuerVerified => vec![format!("{STEP_ISSUER} VALID")],
        UnpackEvent::KeyUnwrapped => vec![format!("{STEP_UNWRAP} OK")],
        UnpackEvent::Decrypted { bytes } => vec![format!("{STEP_DECRYPT} OK ({bytes} bytes)")],
        UnpackEvent::Done => Vec::new(),
        UnpackEvent::Rejected { at, reason } => vec![
            format!("{} FAILED", failed_step(*at)),
            format!("   {reason}"),
            "Verification FAILED, no plaintext written".to_string(),
        ],
    }
}

pub fn run(args: &UnpackArgs) -> Result<()> {
    let envelope = Envelope::load(&args.envelope)
        .with_context(|| format!("Failed to read envelope {}", args.envelope.display()))?;
    let recipient = PrivateKey::load(&args.recipient_private_key)
        .context("Loading recipient private key")?;
    let issuer =
        PublicKey::load(&args.issuer_public_key).context("Loading issuer public key")?;
    let authority = PublicKey::load(&args.authority_public_key)
        .context("Loading authority public key")?;

    let unpackager = Unpackager::new(
        RsaOaepUnwrapper::new(recipient),
        RsaSha512Verifier::new(issuer),
        RsaSha512Verifier::new(authority),
    );

    let unpacked = unpackager
        .unpack_with(&envelope, |event| {
            for line in report_lines(&event) {
                println!("{line}");
            }
        })
        .context("Envelope rejected")?;

    write_atomic(&args.output, &unpacked.payload)
        .with_context(|| format!("Failed to write payload {}", args.output.display()))?;

    println!("Payload written to {}", args.output.display());
    println!("Timestamp: {}", unpacked.timestamp);
    Ok(())
}
