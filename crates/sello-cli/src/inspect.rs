//! `sello-inspect`: show what an envelope holds. Never verifies or decrypts.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sello_core::blocks::TIMESTAMP;
use sello_core::{Envelope, EnvelopeState};

#[derive(Debug, Parser)]
#[command(name = "sello-inspect", version)]
#[command(
    about = "List the blocks and state of an envelope without verifying it",
    long_about = None
)]
pub struct InspectArgs {
    /// Envelope to inspect
    pub envelope: PathBuf,

    /// Log each step
    #[arg(short, long)]
    pub verbose: bool,
}

/// Human-readable summary of `envelope`
pub fn describe(envelope: &Envelope) -> String {
    let mut out = String::new();
    for (name, content) in envelope.blocks() {
        let _ = writeln!(out, "  {name:<20} {:>10} bytes", content.len());
    }

    let state = EnvelopeState::of(envelope);
    let _ = writeln!(out, "State: {state}");
    if state == EnvelopeState::Sealed {
        if let Some(timestamp) = envelope.block(TIMESTAMP) {
            let timestamp = String::from_utf8_lossy(timestamp);
            let _ = writeln!(out, "Timestamp: {timestamp} (not verified)");
        }
    }
    out
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let envelope = Envelope::load(&args.envelope)
        .with_context(|| format!("Failed to read envelope {}", args.envelope.display()))?;

    println!("{} ({} blocks)", args.envelope.display(), envelope.len());
    print!("{}", describe(&envelope));
    Ok(())
}
