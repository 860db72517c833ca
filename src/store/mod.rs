//! Store Module
//!
//! Durable block storage over two files.
//!
//! ## Responsibilities
//! - Append framed blocks to the log, then the matching index record
//! - Keep the hash → location map in memory for O(1) lookups
//! - Recover both files at startup by truncating unreadable tails
//!
//! ## Write Ordering
//! ```text
//! put(hash, block)
//!   ├─ offset = len(blocks.dat)
//!   ├─ append frame(block)          → blocks.dat    (1)
//!   ├─ append (hash, offset, len)   → blocks.index  (2)
//!   └─ map.insert(hash, location)
//! ```
//! A crash between (1) and (2) leaves the log ahead of the index, which
//! `open` repairs by re-indexing. The reverse cannot happen.

mod engine;
mod files;
mod recovery;

pub use engine::{BlockStore, PutOutcome};
pub use recovery::RecoveryReport;
