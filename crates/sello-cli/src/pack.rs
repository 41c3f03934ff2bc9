//! `sello-pack`: issuer side

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sello_core::Packager;
use sello_crypto::{PrivateKey, PublicKey, RsaOaepWrapper, RsaSha512Signer};

#[derive(Debug, Parser)]
#[command(name = "sello-pack", version)]
#[command(
    about = "Encrypt a payload for the recipient and sign it as the issuer",
    long_about = None
)]
pub struct PackArgs {
    /// File to encrypt (an invoice, typically XML)
    pub payload: PathBuf,

    /// Envelope file to create
    pub output: PathBuf,

    /// Recipient public key (SubjectPublicKeyInfo, DER or PEM)
    pub recipient_public_key: PathBuf,

    /// Issuer private key (PKCS#8, DER or PEM)
    pub issuer_private_key: PathBuf,

    /// Log each step
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: &PackArgs) -> Result<()> {
    let payload = fs::read(&args.payload)
        .with_context(|| format!("Failed to read payload {}", args.payload.display()))?;
    tracing::debug!(path = %args.payload.display(), bytes = payload.len(), "read payload");
    let recipient = PublicKey::load(&args.recipient_public_key)
        .context("Loading recipient public key")?;
    let issuer =
        PrivateKey::load(&args.issuer_private_key).context("Loading issuer private key")?;

    let envelope = Packager::new(RsaOaepWrapper::new(recipient), RsaSha512Signer::new(issuer))
        .package(&payload)
        .context("Packaging failed")?;

    envelope
        .save(&args.output)
        .with_context(|| format!("Failed to write envelope {}", args.output.display()))?;

    println!("Envelope written to {}", args.output.display());
    Ok(())
}
