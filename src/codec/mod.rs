//! Binary Codec Module
//!
//! Bounds-checked primitives every on-disk format in the crate is built from.
//!
//! ## Responsibilities
//! - Little-endian fixed-width integers and raw bytes
//! - Canonical variable-length integers for lengths and counts
//! - No partial effects: a failed read leaves the reader where it was

pub mod varint;
mod reader;
mod writer;

pub use reader::Reader;
pub use writer::{Writer, INITIAL_CAPACITY};
