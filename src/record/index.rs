//! Index Record Codec
//!
//! Fixed 44-byte `(hash, offset, length)` records of the index file. The index
//! is derived from the log, so records carry no checksum of their own: a torn
//! write is cut off by truncating the file to a whole number of records.

use crate::codec::{Reader, Writer};
use crate::error::{Result, StoreError};
use crate::types::{BlockLocation, Hash256};

/// Hash (32) + Offset (8) + Length (4)
pub const INDEX_SIZE: usize = 44;

/// One index record: where the block with `hash` lives in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub hash: Hash256,
    pub location: BlockLocation,
}

impl IndexEntry {
    pub fn new(hash: Hash256, location: BlockLocation) -> Self {
        Self { hash, location }
    }

    /// Build from an unchecked hash slice
    pub fn from_parts(hash: &[u8], offset: u64, length: u32) -> Result<Self> {
        Ok(Self {
            hash: Hash256::from_slice(hash)?,
            location: BlockLocation::new(offset, length),
        })
    }

    pub fn encode(&self) -> [u8; INDEX_SIZE] {
        let mut writer = Writer::with_capacity(INDEX_SIZE);
        writer.write_bytes(self.hash.as_bytes());
        writer.write_u64_le(self.location.offset.get());
        writer.write_u32_le(self.location.length.get());

        let mut out = [0u8; INDEX_SIZE];
        out.copy_from_slice(&writer.to_bytes());
        out
    }

    /// Decode exactly one record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != INDEX_SIZE {
            return Err(StoreError::InvalidArgument(format!(
                "index record must be {} bytes, got {}",
                INDEX_SIZE,
                bytes.len()
            )));
        }

        let mut reader = Reader::new(bytes);
        let hash = Hash256::new(reader.read_array()?);
        let offset = reader.read_u64_le()?;
        let length = reader.read_u32_le()?;

        Ok(Self {
            hash,
            location: BlockLocation::new(offset, length),
        })
    }
}
