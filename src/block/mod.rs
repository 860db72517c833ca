//! Block Module
//!
//! The store never interprets block contents itself. It asks a [`BlockCodec`]
//! for the canonical serialization and for the header hash that keys it.
//!
//! [`Block`] is a reference codec: an 80-byte header followed by a varint
//! transaction count and length-prefixed opaque transactions.
//!
//! The length prefix is specific to this codec. A chain whose transactions
//! are self-delimiting (inputs, outputs and lock time with no outer length)
//! serializes differently and should supply its own [`BlockCodec`].

mod header;

pub use header::{BlockHeader, HEADER_SIZE};

use crate::codec::{Reader, Writer};
use crate::error::{Result, StoreError};
use crate::types::Hash256;

/// Serialization and hashing supplied by the caller for each block type
pub trait BlockCodec: Sized {
    /// Canonical content hash of the block's header
    fn header_hash(&self) -> Hash256;

    /// Canonical serialization stored as the record payload
    fn encode(&self) -> Vec<u8>;

    /// Inverse of `encode`
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Opaque serialized transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction(pub Vec<u8>);

/// Header plus ordered transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<RawTransaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<RawTransaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }
}

impl BlockCodec for Block {
    fn header_hash(&self) -> Hash256 {
        self.header.hash()
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.header.write_to(&mut writer);
        writer.write_var_int(self.transactions.len() as u64);
        for tx in &self.transactions {
            writer.write_var_int(tx.0.len() as u64);
            writer.write_bytes(&tx.0);
        }
        writer.to_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let header = BlockHeader::read_from(&mut reader)?;

        let count = reader.read_var_int()?;
        // Every transaction takes at least its one-byte length prefix
        if count > reader.remaining() as u64 {
            return Err(StoreError::Format(format!(
                "transaction count {} exceeds remaining {} bytes",
                count,
                reader.remaining()
            )));
        }

        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = reader.read_var_int()?;
            let len = usize::try_from(len).map_err(|_| {
                StoreError::Format(format!("transaction length {} exceeds usize", len))
            })?;
            transactions.push(RawTransaction(reader.read_bytes(len)?));
        }

        expect_end(&reader, "block")?;
        Ok(Self {
            header,
            transactions,
        })
    }
}

/// Reject trailing bytes after a complete decode
fn expect_end(reader: &Reader<'_>, what: &str) -> Result<()> {
    if !reader.is_at_end() {
        return Err(StoreError::Format(format!(
            "{}: {} trailing bytes",
            what,
            reader.remaining()
        )));
    }
    Ok(())
}
