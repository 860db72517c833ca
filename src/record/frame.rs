//! Record Framer
//!
//! Wraps an opaque payload in a magic + length + checksum envelope.
//!
//! ```text
//! ┌───────────┬─────────────┬─────────────────────┬──────────────┐
//! │ Magic (4) │ Length (4)  │ Payload (Length)    │ Checksum (4) │
//! └───────────┴─────────────┴─────────────────────┴──────────────┘
//! ```
//!
//! There is no resynchronization marker inside the log: any decode failure
//! invalidates everything from that record onwards.

use crate::codec::{Reader, Writer};
use crate::crypto::record_checksum;
use crate::error::{Result, StoreError};
use crate::types::PayloadLen;

/// Marks the first byte of every framed record (`F9 BE B4 D9` on disk)
pub const MAGIC: u32 = 0xD9B4_BEF9;

/// Leading bytes of double SHA-256 kept as the record checksum
pub const CHECKSUM_LENGTH: usize = 4;

/// Magic (4) + Length (4)
pub const FRAME_HEADER_SIZE: usize = 8;

/// Payload recovered from a record plus the offset just past it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub payload: Vec<u8>,
    pub next_offset: usize,
}

/// On-disk size of a record carrying `payload_len` bytes
pub fn framed_len(payload_len: usize) -> usize {
    FRAME_HEADER_SIZE + payload_len + CHECKSUM_LENGTH
}

/// On-disk size of a record whose header declares `length`
pub fn record_len(length: PayloadLen) -> u64 {
    (FRAME_HEADER_SIZE + CHECKSUM_LENGTH) as u64 + length.get() as u64
}

/// Frame a payload for the block log
pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
    let mut writer = Writer::with_capacity(framed_len(payload.len()));
    writer.write_u32_le(MAGIC);
    writer.write_len_u32(payload.len())?;
    writer.write_bytes(payload);
    writer.write_bytes(&record_checksum(payload));
    Ok(writer.to_bytes())
}

/// Validate the header at `offset` and return the declared payload length
pub fn read_header(buf: &[u8], offset: usize) -> Result<PayloadLen> {
    let mut reader = Reader::at(buf, offset)?;

    if reader.remaining() < FRAME_HEADER_SIZE {
        return Err(StoreError::TruncatedHeader {
            offset,
            need: FRAME_HEADER_SIZE,
            have: reader.remaining(),
        });
    }

    let magic = reader.read_u32_le()?;
    if magic != MAGIC {
        return Err(StoreError::MagicMismatch {
            offset,
            found: magic,
            expected: MAGIC,
        });
    }

    Ok(PayloadLen::new(reader.read_u32_le()?))
}

/// Decode one record starting at `offset` (relative to `buf`)
pub fn decode_at(buf: &[u8], offset: usize) -> Result<DecodedFrame> {
    let length = read_header(buf, offset)?;
    let mut reader = Reader::at(buf, offset + FRAME_HEADER_SIZE)?;

    let need = length.get() as u64 + CHECKSUM_LENGTH as u64;
    if (reader.remaining() as u64) < need {
        return Err(StoreError::TruncatedBody {
            offset,
            payload_len: length.get(),
            need: need as usize,
            have: reader.remaining(),
        });
    }

    let payload = reader.read_bytes(length.as_usize())?;
    let checksum: [u8; CHECKSUM_LENGTH] = reader.read_array()?;

    if checksum != record_checksum(&payload) {
        return Err(StoreError::ChecksumMismatch {
            offset,
            payload_len: length.get(),
        });
    }

    Ok(DecodedFrame {
        payload,
        next_offset: reader.position(),
    })
}
