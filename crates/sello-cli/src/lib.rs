//! Sello CLI - shared plumbing for the envelope tools
//!
//! Binaries:
//!   sello-pack     - encrypt a payload and sign it as the issuer
//!   sello-seal     - timestamp and counter-sign as the authority
//!   sello-unpack   - verify both signatures and decrypt as the recipient
//!   sello-inspect  - list the blocks of an envelope without verifying

pub mod inspect;
pub mod pack;
pub mod seal;
pub mod unpack;

use std::io::IsTerminal;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
///
/// Colour is only used when stderr is a terminal.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

/// Parse argv, exiting with status 1 and the usage on stdout when it is wrong.
///
/// `--help` and `--version` still exit 0.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprint!("{}", err.render());
            println!("{}", T::command().render_help());
            std::process::exit(1);
        }
    }
}
