//! Sello Envelope - named-block container
//!
//! An envelope is an ordered, append-only set of named byte blocks. This
//! crate knows nothing about what the blocks mean; it only guarantees
//! name-addressed, length-exact storage and all-or-nothing persistence.

mod atomic;
mod container;

pub use atomic::write_atomic;
pub use container::{Envelope, FORMAT_VERSION, MAGIC};

use std::path::PathBuf;

/// Errors from container operations
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Block already present: {0}")]
    DuplicateBlock(String),

    #[error("Block names must not be empty")]
    InvalidName,

    #[error("Corrupt envelope: {0}")]
    Corrupt(String),

    #[error("Failed to encode envelope: {0}")]
    Encode(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContainerError>;
