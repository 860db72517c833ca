//! Canonical VarInt (CompactSize)
//!
//! ```text
//! value range        encoding
//! < 0xFD             1 byte: the value itself
//! <= 0xFFFF          0xFD + u16 LE
//! <= 0xFFFF_FFFF     0xFE + u32 LE
//! <= u64::MAX        0xFF + u64 LE
//! ```
//!
//! Decoding accepts only the shortest form of each value, so every value has
//! exactly one valid encoding.

use crate::error::{Result, StoreError};

/// Longest possible encoding: prefix + 8 bytes
pub const MAX_VARINT_LEN: usize = 9;

const PREFIX_U16: u8 = 0xFD;
const PREFIX_U32: u8 = 0xFE;
const PREFIX_U64: u8 = 0xFF;

/// Number of bytes `encode(value)` produces
pub fn encoded_len(value: u64) -> usize {
    match value {
        v if v < PREFIX_U16 as u64 => 1,
        v if v <= 0xFFFF => 3,
        v if v <= 0xFFFF_FFFF => 5,
        _ => MAX_VARINT_LEN,
    }
}

/// Encode `value` in its canonical form
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    if value < PREFIX_U16 as u64 {
        out.push(value as u8);
    } else if value <= 0xFFFF {
        out.push(PREFIX_U16);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xFFFF_FFFF {
        out.push(PREFIX_U32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(PREFIX_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode a varint starting at `offset`
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    let prefix = *bytes.get(offset).ok_or(StoreError::VarIntEof {
        offset,
        need: 1,
        have: bytes.len().saturating_sub(offset),
    })?;

    match prefix {
        PREFIX_U16 => {
            let value = u16::from_le_bytes(take(bytes, offset)?) as u64;
            canonical(prefix, value, PREFIX_U16 as u64)?;
            Ok((value, 3))
        }
        PREFIX_U32 => {
            let value = u32::from_le_bytes(take(bytes, offset)?) as u64;
            canonical(prefix, value, 0x1_0000)?;
            Ok((value, 5))
        }
        PREFIX_U64 => {
            let value = u64::from_le_bytes(take(bytes, offset)?);
            canonical(prefix, value, 0x1_0000_0000)?;
            Ok((value, MAX_VARINT_LEN))
        }
        small => Ok((small as u64, 1)),
    }
}

/// Copy the `N` bytes following the prefix at `offset`
fn take<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    let start = offset + 1;
    let have = bytes.len() - offset;
    bytes
        .get(start..start + N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(StoreError::VarIntEof {
            offset,
            need: 1 + N,
            have,
        })
}

/// Reject values that fit a shorter form
fn canonical(prefix: u8, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(StoreError::NonCanonicalVarInt { prefix, value });
    }
    Ok(())
}
