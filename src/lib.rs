//! # blockstore
//!
//! Crash-safe storage for immutable blocks, retrieved by content hash:
//! - Append-only block log with magic + length + checksum framing
//! - Fixed 44-byte index records derived from the log
//! - Recovery by truncation of any unreadable tail at startup
//! - Bounds-checked binary reader/writer and canonical VarInts
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BlockStore                            │
//! │            (put serialized, get concurrent)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ blocks.dat  │          │blocks.index │
//!   │  (frames)   │          │ (44B recs)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                         │
//!          └────────────┬────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │ codec: Reader│
//!               │ Writer VarInt│
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod types;
pub mod crypto;

pub mod codec;
pub mod record;
pub mod block;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use block::{Block, BlockCodec, BlockHeader, RawTransaction};
pub use config::{IndexVerification, StoreConfig, SyncStrategy};
pub use error::{ErrorKind, Result, StoreError};
pub use store::{BlockStore, PutOutcome, RecoveryReport};
pub use types::{BlockLocation, Hash256, PayloadLen, RecordOffset};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of blockstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
