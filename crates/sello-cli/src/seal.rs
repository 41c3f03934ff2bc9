//! `sello-seal`: authority side

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sello_core::{Envelope, Sealer};
use sello_crypto::{PrivateKey, PublicKey, RsaSha512Signer, RsaSha512Verifier};

#[derive(Debug, Parser)]
#[command(name = "sello-seal", version)]
#[command(
    about = "Verify the issuer, timestamp and counter-sign an envelope in place",
    long_about = None
)]
pub struct SealArgs {
    /// Issuer-signed envelope; replaced atomically on success
    pub envelope: PathBuf,

    /// Issuer public key (SubjectPublicKeyInfo, DER or PEM)
    pub issuer_public_key: PathBuf,

    /// Authority private key (PKCS#8, DER or PEM)
    pub authority_private_key: PathBuf,

    /// Log each step
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: &SealArgs) -> Result<()> {
    let envelope = Envelope::load(&args.envelope)
        .with_context(|| format!("Failed to read envelope {}", args.envelope.display()))?;
    let issuer =
        PublicKey::load(&args.issuer_public_key).context("Loading issuer public key")?;
    let authority = PrivateKey::load(&args.authority_private_key)
        .context("Loading authority private key")?;

    let sealed = Sealer::new(RsaSha512Verifier::new(issuer), RsaSha512Signer::new(authority))
        .seal(envelope)
        .context("Sealing refused")?;

    sealed
        .envelope
        .save(&args.envelope)
        .with_context(|| format!("Failed to write envelope {}", args.envelope.display()))?;

    println!("Envelope sealed: {}", args.envelope.display());
    println!("Timestamp: {}", sealed.timestamp);
    Ok(())
}
