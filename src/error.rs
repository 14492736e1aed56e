//! Error types for reading rres archives.

use thiserror::Error;

/// Which half of the codec seam rejected a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Compression,
    Encryption,
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecKind::Compression => f.write_str("compression"),
            CodecKind::Encryption => f.write_str("encryption"),
        }
    }
}

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum RresError {
    /// An error reported by the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes were available than a declared structure needs.
    #[error("truncated input: needed {needed} bytes at offset {offset}")]
    TruncatedInput { offset: u64, needed: u64 },

    /// The archive does not start with a valid rres file header.
    #[error("invalid file header: {0}")]
    InvalidFileHeader(String),

    /// Size or count fields inside a chunk contradict each other.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),

    /// The stored CRC32 does not match the payload read from the archive.
    #[error("CRC32 mismatch in chunk {id:#010x}: expected {expected:#010x}, got {actual:#010x}")]
    IntegrityError { id: u32, expected: u32, actual: u32 },

    /// No plugin is registered for the declared algorithm id.
    #[error("unsupported {kind} type: {id}")]
    UnsupportedCodec { kind: CodecKind, id: u8 },

    /// A registered codec plugin failed on the payload.
    #[error("codec failure: {0}")]
    Codec(String),

    /// The chunk is encrypted but no key was supplied.
    #[error("chunk is encrypted but no cipher key is set")]
    KeyRequired,
}

/// A convenience `Result` alias using [`RresError`].
pub type Result<T> = std::result::Result<T, RresError>;
