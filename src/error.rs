//! Error types for the block store
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::types::Hash256;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Coarse classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller bug: malformed input, never retried
    Argument,

    /// Corrupted or adversarial bytes
    Format,

    /// Truncated buffer during a decode
    Bounds,

    /// Filesystem failure
    Io,
}

/// Unified error type for block store operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store opened read-only")]
    ReadOnly,

    // -------------------------------------------------------------------------
    // Bounds Errors
    // -------------------------------------------------------------------------
    #[error("{op} out of bounds (pos={pos}, need={need}, length={length})")]
    OutOfBounds {
        op: &'static str,
        pos: usize,
        need: usize,
        length: usize,
    },

    #[error("Unexpected EOF while decoding varint at offset={offset} (need {need}, have {have})")]
    VarIntEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("Truncated record header at offset={offset} (need {need}, have {have})")]
    TruncatedHeader {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("Truncated record body at offset={offset} (payload_len={payload_len}, need={need}, have={have})")]
    TruncatedBody {
        offset: usize,
        payload_len: u32,
        need: usize,
        have: usize,
    },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Non-canonical varint: prefix 0x{prefix:02x} encodes {value}")]
    NonCanonicalVarInt { prefix: u8, value: u64 },

    #[error("Magic mismatch at offset={offset} (got 0x{found:08x}, expected 0x{expected:08x})")]
    MagicMismatch {
        offset: usize,
        found: u32,
        expected: u32,
    },

    #[error("Checksum mismatch at offset={offset} (payload_len={payload_len})")]
    ChecksumMismatch { offset: usize, payload_len: u32 },

    #[error("Index entry disagrees with log at offset={offset} (indexed length {expected}, stored length {found})")]
    IndexMismatch {
        offset: u64,
        expected: u32,
        found: u32,
    },

    #[error("Stored block at offset={offset} hashes to {found}, index key is {expected}")]
    HashMismatch {
        offset: u64,
        expected: Hash256,
        found: Hash256,
    },

    #[error("Format error: {0}")]
    Format(String),
}

impl StoreError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Io(_) => ErrorKind::Io,
            StoreError::InvalidArgument(_) | StoreError::ReadOnly => ErrorKind::Argument,
            StoreError::OutOfBounds { .. }
            | StoreError::VarIntEof { .. }
            | StoreError::TruncatedHeader { .. }
            | StoreError::TruncatedBody { .. } => ErrorKind::Bounds,
            StoreError::NonCanonicalVarInt { .. }
            | StoreError::MagicMismatch { .. }
            | StoreError::ChecksumMismatch { .. }
            | StoreError::IndexMismatch { .. }
            | StoreError::HashMismatch { .. }
            | StoreError::Format(_) => ErrorKind::Format,
        }
    }

    /// True for errors the startup scan turns into a truncation
    pub fn is_corruption(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::Bounds)
    }
}
