//! Byte Reader
//!
//! Bounds-checked little-endian decoding over a borrowed slice.
//!
//! A failing read, peek, seek or skip never moves the cursor, so callers can
//! attempt a speculative decode and abandon it cleanly.

use crate::error::{Result, StoreError};

use super::varint;

/// Cursor over an immutable byte slice
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Reader positioned at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Reader positioned at `offset`; `offset == bytes.len()` means "at end"
    pub fn at(bytes: &'a [u8], offset: usize) -> Result<Self> {
        if offset > bytes.len() {
            return Err(StoreError::InvalidArgument(format!(
                "reader offset out of range (offset={}, length={})",
                offset,
                bytes.len()
            )));
        }
        Ok(Self { bytes, pos: offset })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Move the cursor to an absolute position
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.bytes.len() {
            return Err(StoreError::OutOfBounds {
                op: "seek",
                pos,
                need: 0,
                length: self.bytes.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        let end = self.end_of("skip", n)?;
        self.pos = end;
        Ok(())
    }

    /// Read `n` bytes into an owned buffer
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let end = self.end_of("read_bytes", n)?;
        let out = self.bytes[self.pos..end].to_vec();
        self.pos = end;
        Ok(out)
    }

    /// Copy `n` bytes without advancing
    pub fn peek_bytes(&self, n: usize) -> Result<Vec<u8>> {
        let end = self.end_of("peek_bytes", n)?;
        Ok(self.bytes[self.pos..end].to_vec())
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.fixed("read_array")
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let end = self.end_of("read_u8", 1)?;
        let value = self.bytes[self.pos];
        self.pos = end;
        Ok(value)
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.fixed("read_u16_le").map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.fixed("read_u32_le").map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        self.fixed("read_u64_le").map(u64::from_le_bytes)
    }

    /// Read a canonical varint
    pub fn read_var_int(&mut self) -> Result<u64> {
        let (value, size) = varint::decode(self.bytes, self.pos)?;
        self.pos += size;
        Ok(value)
    }

    fn fixed<const N: usize>(&mut self, op: &'static str) -> Result<[u8; N]> {
        let end = self.end_of(op, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(out)
    }

    /// Position after consuming `n` bytes, or the error a read of `n` would raise
    fn end_of(&self, op: &'static str, n: usize) -> Result<usize> {
        let end = self.pos.checked_add(n).ok_or_else(|| {
            StoreError::InvalidArgument(format!(
                "{}: length overflows cursor (pos={}, n={})",
                op, self.pos, n
            ))
        })?;
        if end > self.bytes.len() {
            return Err(StoreError::OutOfBounds {
                op,
                pos: self.pos,
                need: n,
                length: self.bytes.len(),
            });
        }
        Ok(end)
    }
}
