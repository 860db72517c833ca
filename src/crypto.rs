//! Hashing helpers
//!
//! `double_sha256(x)` is SHA256(SHA256(x)). It keys blocks by header hash
//! and its leading bytes checksum every framed record.

use sha2::{Digest, Sha256};

use crate::record::frame::CHECKSUM_LENGTH;
use crate::types::Hash256;

/// SHA256(SHA256(data))
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second: [u8; Hash256::LEN] = Sha256::digest(first).into();
    Hash256::new(second)
}

/// Leading `CHECKSUM_LENGTH` bytes of the double SHA-256 of a record payload
pub fn record_checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let digest = double_sha256(payload);
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    checksum.copy_from_slice(&digest.as_bytes()[..CHECKSUM_LENGTH]);
    checksum
}
