//! Block Header
//!
//! ```text
//! version (4) | prev_block_hash (32) | merkle_root (32) | time (4) | bits (4) | nonce (4)
//! ```
//! All integers little-endian; 80 bytes total. These exact bytes are what
//! the block hash is computed over.

use crate::codec::{Reader, Writer};
use crate::crypto::double_sha256;
use crate::error::Result;
use crate::types::Hash256;

/// Encoded header size
pub const HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block_hash: Hash256,
    pub merkle_root: Hash256,
    pub time: u32,
    /// Compact target representation
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::with_capacity(HEADER_SIZE);
        self.write_to(&mut writer);
        writer.to_bytes()
    }

    pub(crate) fn write_to(&self, writer: &mut Writer) {
        writer.write_u32_le(self.version);
        writer.write_bytes(self.prev_block_hash.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u32_le(self.time);
        writer.write_u32_le(self.bits);
        writer.write_u32_le(self.nonce);
    }

    pub(crate) fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            version: reader.read_u32_le()?,
            prev_block_hash: Hash256::new(reader.read_array()?),
            merkle_root: Hash256::new(reader.read_array()?),
            time: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }

    /// Decode a header from exactly the bytes given
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let header = Self::read_from(&mut reader)?;
        super::expect_end(&reader, "block header")?;
        Ok(header)
    }

    /// double-SHA256 of the encoded header
    pub fn hash(&self) -> Hash256 {
        double_sha256(&self.encode())
    }
}
