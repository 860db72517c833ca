//! Record Module
//!
//! On-disk units of the two store files.
//!
//! ## File Format
//! ```text
//! blocks.dat (append-only log)
//! ┌─────────────────────────────────────────────┐
//! │ Record 1                                    │
//! │ ┌─────────┬─────────┬──────────┬──────────┐ │
//! │ │Magic (4)│ Len (4) │ Payload  │ Cksum (4)│ │
//! │ └─────────┴─────────┴──────────┴──────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Record 2 ...                                │
//! └─────────────────────────────────────────────┘
//!
//! blocks.index (derived, 44 bytes per record)
//! ┌───────────────┬──────────────┬─────────────┐
//! │ Hash (32)     │ Offset (8)   │ Length (4)  │
//! └───────────────┴──────────────┴─────────────┘
//! ```
//!
//! `Offset` points at the record's magic; `Length` is the payload length only.

pub mod frame;
pub mod index;

pub use frame::{DecodedFrame, CHECKSUM_LENGTH, FRAME_HEADER_SIZE, MAGIC};
pub use index::{IndexEntry, INDEX_SIZE};
