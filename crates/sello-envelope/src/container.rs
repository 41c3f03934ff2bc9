//! Envelope container and its on-disk format
//!
//! Layout (bincode 1.x, fixed-width little-endian integers):
//!
//! ```text
//! magic    4 bytes   "SELO"
//! version  u8        1
//! count    u64 LE
//! count x {
//!     name_len u64 LE, name bytes (UTF-8, non-empty)
//!     data_len u64 LE, data bytes
//! }
//! ```
//!
//! Nothing may follow the last block.

use std::collections::HashSet;
use std::path::Path;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::{atomic, ContainerError, Result};

/// File signature at offset 0
pub const MAGIC: [u8; 4] = *b"SELO";
/// Current layout version
pub const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Block {
    name: String,
    content: Vec<u8>,
}

#[derive(Serialize)]
struct EnvelopeFileRef<'a> {
    magic: [u8; 4],
    version: u8,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct EnvelopeFile {
    magic: [u8; 4],
    version: u8,
    blocks: Vec<Block>,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Ordered, append-only collection of named byte blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    blocks: Vec<Block>,
}

impl Envelope {
    /// An empty envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block. Existing blocks are never replaced.
    pub fn add_block(
        &mut self,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContainerError::InvalidName);
        }
        if self.contains(&name) {
            return Err(ContainerError::DuplicateBlock(name));
        }
        self.blocks.push(Block {
            name,
            content: content.into(),
        });
        Ok(())
    }

    /// Content of the named block, if present
    pub fn block(&self, name: &str) -> Option<&[u8]> {
        self.blocks
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.content.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.iter().any(|b| b.name == name)
    }

    /// Block names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }

    /// `(name, content)` pairs in insertion order
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.blocks
            .iter()
            .map(|b| (b.name.as_str(), b.content.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Encode to the on-disk layout
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let file = EnvelopeFileRef {
            magic: MAGIC,
            version: FORMAT_VERSION,
            blocks: &self.blocks,
        };
        codec()
            .serialize(&file)
            .map_err(|e| ContainerError::Encode(e.to_string()))
    }

    /// Decode the on-disk layout, rejecting anything malformed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file: EnvelopeFile = codec()
            .with_limit(bytes.len() as u64)
            .deserialize(bytes)
            .map_err(|e| ContainerError::Corrupt(e.to_string()))?;

        if file.magic != MAGIC {
            return Err(ContainerError::Corrupt("not a Sello envelope (bad magic)".into()));
        }
        if file.version != FORMAT_VERSION {
            return Err(ContainerError::Corrupt(format!(
                "unsupported format version {}",
                file.version
            )));
        }

        let mut seen = HashSet::new();
        for block in &file.blocks {
            if block.name.is_empty() {
                return Err(ContainerError::Corrupt("block with empty name".into()));
            }
            if !seen.insert(block.name.as_str()) {
                return Err(ContainerError::Corrupt(format!(
                    "duplicate block {}",
                    block.name
                )));
            }
        }

        Ok(Self {
            blocks: file.blocks,
        })
    }

    /// Read and decode an envelope file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ContainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let envelope = Self::from_bytes(&bytes)?;
        tracing::debug!(path = %path.display(), blocks = envelope.len(), "loaded envelope");
        Ok(envelope)
    }

    /// Encode and atomically write an envelope file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        atomic::write_atomic(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        let mut env = Envelope::new();
        env.add_block("CIPHERTEXT", vec![0xC1; 32]).unwrap();
        env.add_block("WRAPPED_KEY", vec![0x4B; 128]).unwrap();
        env.add_block("IV", vec![0x17; 16]).unwrap();
        env
    }

    /// Hand-encode blocks in the documented layout
    fn encode_raw(magic: &[u8], version: u8, blocks: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = magic.to_vec();
        out.push(version);
        out.extend_from_slice(&(blocks.len() as u64).to_le_bytes());
        for (name, data) in blocks {
            out.extend_from_slice(&(name.len() as u64).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&(data.len() as u64).to_le_bytes());
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn test_add_and_get_blocks() {
        let env = sample();
        assert_eq!(env.len(), 3);
        assert_eq!(env.block("IV"), Some(&[0x17; 16][..]));
        assert_eq!(env.block("TIMESTAMP"), None);
        assert!(env.contains("WRAPPED_KEY"));
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let mut env = sample();
        let err = env.add_block("IV", vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, ContainerError::DuplicateBlock(name) if name == "IV"));
        // Original content untouched
        assert_eq!(env.block("IV"), Some(&[0x17; 16][..]));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut env = Envelope::new();
        assert!(matches!(env.add_block("", b"x".to_vec()), Err(ContainerError::InvalidName)));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut env = Envelope::new();
        env.add_block("Z", b"1".to_vec()).unwrap();
        env.add_block("A", b"2".to_vec()).unwrap();
        env.add_block("M", b"3".to_vec()).unwrap();

        let names: Vec<_> = env.names().collect();
        assert_eq!(names, ["Z", "A", "M"]);

        let decoded = Envelope::from_bytes(&env.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.names().collect::<Vec<_>>(), ["Z", "A", "M"]);
    }

    #[test]
    fn test_layout_is_bit_exact() {
        let mut env = Envelope::new();
        env.add_block("IV", vec![1, 2]).unwrap();

        let expected = encode_raw(b"SELO", 1, &[("IV", &[1, 2])]);
        assert_eq!(env.to_bytes().unwrap(), expected);
        assert_eq!(
            expected,
            [
                b'S', b'E', b'L', b'O', 1, //
                1, 0, 0, 0, 0, 0, 0, 0, //
                2, 0, 0, 0, 0, 0, 0, 0, b'I', b'V', //
                2, 0, 0, 0, 0, 0, 0, 0, 1, 2,
            ]
        );
    }

    #[test]
    fn test_empty_and_binary_content_survive() {
        let mut env = Envelope::new();
        env.add_block("EMPTY", Vec::new()).unwrap();
        env.add_block("BIN", (0..=255u8).collect::<Vec<_>>()).unwrap();

        let decoded = Envelope::from_bytes(&env.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, env);
        assert_eq!(decoded.block("EMPTY"), Some(&[][..]));
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let bytes = encode_raw(b"ZIP!", 1, &[("IV", b"x")]);
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let bytes = encode_raw(b"SELO", 9, &[("IV", b"x")]);
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_is_corrupt() {
        let bytes = sample().to_bytes().unwrap();
        for cut in [0, 3, 5, 13, bytes.len() - 1] {
            assert!(
                matches!(Envelope::from_bytes(&bytes[..cut]), Err(ContainerError::Corrupt(_))),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_huge_length_prefix_is_corrupt() {
        let mut bytes = encode_raw(b"SELO", 1, &[]);
        // Claim 2^40 blocks with nothing behind them
        bytes[5..13].copy_from_slice(&(1u64 << 40).to_le_bytes());
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_duplicate_in_file_is_corrupt() {
        let bytes = encode_raw(b"SELO", 1, &[("IV", b"a"), ("IV", b"b")]);
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_empty_name_in_file_is_corrupt() {
        let bytes = encode_raw(b"SELO", 1, &[("", b"a")]);
        assert!(matches!(Envelope::from_bytes(&bytes), Err(ContainerError::Corrupt(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.selo");

        let env = sample();
        env.save(&path).unwrap();

        assert_eq!(Envelope::load(&path).unwrap(), env);
    }

    #[test]
    fn test_load_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = Envelope::load(dir.path().join("missing.selo")).unwrap_err();
        assert!(matches!(err, ContainerError::Io { .. }));
    }
}
