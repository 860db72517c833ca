//! Byte Writer
//!
//! Growable little-endian encoder backed by `BytesMut`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, StoreError};

use super::varint;

/// Starting capacity of a fresh writer
pub const INITIAL_CAPACITY: usize = 1024;

/// Owned output buffer with a write cursor at its end
#[derive(Debug, Clone)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Make room for `need` more bytes
    ///
    /// Grows to double the current capacity or exactly to the required size,
    /// whichever is larger. Written bytes are preserved.
    pub fn ensure_capacity(&mut self, need: usize) {
        let required = self.buf.len() + need;
        if required <= self.buf.capacity() {
            return;
        }
        let target = (self.buf.capacity() * 2).max(required);
        self.buf.reserve(target - self.buf.len());
    }

    pub fn write_u8(&mut self, value: u8) {
        self.ensure_capacity(1);
        self.buf.put_u8(value);
    }

    pub fn write_u16_le(&mut self, value: u16) {
        self.ensure_capacity(2);
        self.buf.put_u16_le(value);
    }

    pub fn write_u32_le(&mut self, value: u32) {
        self.ensure_capacity(4);
        self.buf.put_u32_le(value);
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.ensure_capacity(8);
        self.buf.put_u64_le(value);
    }

    /// Write a length as u32 LE, rejecting lengths wider than 32 bits
    ///
    /// The buffer is untouched when the length is rejected.
    pub fn write_len_u32(&mut self, len: usize) -> Result<()> {
        let value = u32::try_from(len).map_err(|_| {
            StoreError::InvalidArgument(format!(
                "write_len_u32: value out of range [0, 2^32 - 1] (value={})",
                len
            ))
        })?;
        self.write_u32_le(value);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buf.put_slice(bytes);
    }

    /// Write a canonical varint
    pub fn write_var_int(&mut self, value: u64) {
        self.write_bytes(&varint::encode(value));
    }

    /// Exact-length copy of the written bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Consume the writer, returning the written bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
