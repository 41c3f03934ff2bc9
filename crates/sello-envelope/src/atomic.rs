//! All-or-nothing file replacement
//!
//! Output is written to a temporary file in the destination directory,
//! synced, then renamed over the target. A reader sees either the old file
//! or the complete new one, never a torn write.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{ContainerError, Result};

/// Atomically replace (or create) `path` with `contents`
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source: std::io::Error| ContainerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file atomically");
    Ok(())
}
