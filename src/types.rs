//! Strong value types shared across the crate
//!
//! Hashes, log offsets and payload lengths each get their own type so a
//! byte offset can never be passed where a payload length is expected.

use std::fmt;

use crate::error::{Result, StoreError};
use crate::record::frame;

// =============================================================================
// Hash256
// =============================================================================

/// Opaque 32-byte content digest, the sole lookup key of the store
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; Hash256::LEN]);

impl Hash256 {
    /// Digest size in bytes
    pub const LEN: usize = 32;

    pub const fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// All-zero hash
    pub const fn zero() -> Self {
        Self([0u8; Self::LEN])
    }

    /// Build from a slice, rejecting anything that is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            StoreError::InvalidArgument(format!(
                "hash must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a 64-character hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| StoreError::InvalidArgument(format!("invalid hash hex {:?}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; Hash256::LEN]> for Hash256 {
    fn from(bytes: [u8; Hash256::LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_hex())
    }
}

// =============================================================================
// Offsets and Lengths
// =============================================================================

/// Byte position of a record's magic field in the block log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordOffset(u64);

impl RecordOffset {
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Length of a serialized block payload (excludes header and checksum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadLen(u32);

impl PayloadLen {
    pub const fn new(len: u32) -> Self {
        Self(len)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<usize> for PayloadLen {
    type Error = StoreError;

    fn try_from(len: usize) -> Result<Self> {
        u32::try_from(len).map(Self).map_err(|_| {
            StoreError::InvalidArgument(format!(
                "payload length {} exceeds u32 range",
                len
            ))
        })
    }
}

impl fmt::Display for PayloadLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// BlockLocation
// =============================================================================

/// Where a block lives in the log: the in-memory index value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockLocation {
    pub offset: RecordOffset,
    pub length: PayloadLen,
}

impl BlockLocation {
    pub const fn new(offset: u64, length: u32) -> Self {
        Self {
            offset: RecordOffset::new(offset),
            length: PayloadLen::new(length),
        }
    }

    /// Size of the whole framed record on disk
    pub fn record_len(&self) -> u64 {
        frame::record_len(self.length)
    }

    /// Offset just past this record
    pub fn end(&self) -> u64 {
        self.offset.get() + self.record_len()
    }
}
