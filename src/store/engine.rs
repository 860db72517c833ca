//! BlockStore Engine
//!
//! Owns the block log, the index file and the in-memory hash → location map.

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::block::BlockCodec;
use crate::config::{StoreConfig, SyncStrategy};
use crate::error::{Result, StoreError};
use crate::record::{frame, IndexEntry};
use crate::types::{BlockLocation, Hash256, PayloadLen, RecordOffset};

use super::files;
use super::recovery::{self, RecoveryReport};

/// What a `put` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The block was appended at this location
    Stored(BlockLocation),

    /// The hash was already stored; nothing was written
    AlreadyPresent,
}

/// Append-only block store keyed by header hash
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader
///
/// - **Writes** (`put`): serialized by `write_lock`, so reading the log size
///   and appending at that size happen as one step
/// - **Reads** (`get`, `contains`, ...): take the map read lock only; records
///   are immutable once appended and the map is updated after both appends
///
/// There is no cross-process locking: one process per data directory.
pub struct BlockStore<B: BlockCodec> {
    /// Store configuration
    config: StoreConfig,

    dat_path: PathBuf,
    index_path: PathBuf,

    /// In-memory index: hash → location in the log
    index: RwLock<HashMap<Hash256, BlockLocation>>,

    /// Serializes puts
    write_lock: Mutex<()>,

    /// What the opening recovery pass did
    recovery: RecoveryReport,

    /// Set by `open_read_only`; rejects every `put`
    read_only: bool,

    _block: PhantomData<fn() -> B>,
}

impl<B: BlockCodec> BlockStore<B> {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory and both files if absent
    /// 2. Truncate the log after its last valid record
    /// 3. Truncate the index to whole records and load it
    /// 4. Reconcile index and log (unless configured to trust the index)
    pub fn open(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let dat_path = config.dat_path();
        let index_path = config.index_path();
        files::ensure_file(&dat_path)?;
        files::ensure_file(&index_path)?;

        let recovered = recovery::recover::<B>(&config, true)?;

        info!(
            data_dir = %config.data_dir.display(),
            blocks = recovered.map.len(),
            clean = recovered.report.is_clean(),
            "block store opened"
        );

        Ok(Self {
            config,
            dat_path,
            index_path,
            index: RwLock::new(recovered.map),
            write_lock: Mutex::new(()),
            recovery: recovered.report,
            read_only: false,
            _block: PhantomData,
        })
    }

    /// Open an existing store for lookups without modifying any file
    ///
    /// Recovery runs as in [`verify`](Self::verify): unreadable tails are
    /// skipped in memory but left on disk, and `put` fails with
    /// [`StoreError::ReadOnly`]. Both files must already exist.
    pub fn open_read_only(config: StoreConfig) -> Result<Self> {
        let recovered = recovery::recover::<B>(&config, false)?;

        info!(
            data_dir = %config.data_dir.display(),
            blocks = recovered.map.len(),
            clean = recovered.report.is_clean(),
            "block store opened read-only"
        );

        Ok(Self {
            dat_path: config.dat_path(),
            index_path: config.index_path(),
            config,
            index: RwLock::new(recovered.map),
            write_lock: Mutex::new(()),
            recovery: recovered.report,
            read_only: true,
            _block: PhantomData,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(StoreConfig::builder().data_dir(path).build())
    }

    /// Run the recovery scans without modifying any file
    ///
    /// Both files must already exist.
    pub fn verify(config: &StoreConfig) -> Result<RecoveryReport> {
        Ok(recovery::recover::<B>(config, false)?.report)
    }

    /// Store `block` under `hash`
    ///
    /// `hash` must equal the block's header hash. Storing a hash that is
    /// already present is a no-op; the offered block is not compared with the
    /// stored one.
    pub fn put(&self, hash: &Hash256, block: &B) -> Result<PutOutcome> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let expected = block.header_hash();
        if expected != *hash {
            return Err(StoreError::InvalidArgument(format!(
                "hash mismatch: got {}, block header hashes to {}",
                hash, expected
            )));
        }

        let _write_guard = self.write_lock.lock();

        if self.index.read().contains_key(hash) {
            debug!(%hash, "block already stored");
            return Ok(PutOutcome::AlreadyPresent);
        }

        let payload = block.encode();
        let length = PayloadLen::try_from(payload.len())?;
        let record = frame::encode(&payload)?;
        let sync = self.config.sync_strategy == SyncStrategy::EveryWrite;

        // Offset is the log size right before the append
        let offset = RecordOffset::new(files::file_len(&self.dat_path)?);
        let location = BlockLocation { offset, length };

        // Log first: the index must never reference a record the log lacks
        files::append(&self.dat_path, &record, sync)?;
        files::append(&self.index_path, &IndexEntry::new(*hash, location).encode(), sync)?;

        self.index.write().insert(*hash, location);

        debug!(%hash, offset = offset.get(), length = length.get(), "block stored");
        Ok(PutOutcome::Stored(location))
    }

    /// Serialized payload of the block stored under `hash`
    pub fn get_raw(&self, hash: &Hash256) -> Result<Option<Vec<u8>>> {
        Ok(self.read_block(hash)?.map(|(payload, _)| payload))
    }

    /// Decoded block stored under `hash`
    pub fn get(&self, hash: &Hash256) -> Result<Option<B>> {
        Ok(self.read_block(hash)?.map(|(_, block)| block))
    }

    /// Read the record indexed under `hash` and check the block it holds
    /// hashes back to `hash`
    fn read_block(&self, hash: &Hash256) -> Result<Option<(Vec<u8>, B)>> {
        let location = match self.location(hash) {
            Some(location) => location,
            None => return Ok(None),
        };

        let payload = recovery::read_record(&self.dat_path, &location)?;
        let block = B::decode(&payload)?;
        let found = block.header_hash();
        if found != *hash {
            return Err(StoreError::HashMismatch {
                offset: location.offset.get(),
                expected: *hash,
                found,
            });
        }
        Ok(Some((payload, block)))
    }

    pub fn contains(&self, hash: &Hash256) -> bool {
        self.index.read().contains_key(hash)
    }

    pub fn location(&self, hash: &Hash256) -> Option<BlockLocation> {
        self.index.read().get(hash).copied()
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Snapshot of all index entries in log order
    pub fn entries(&self) -> Vec<IndexEntry> {
        let mut entries: Vec<IndexEntry> = self
            .index
            .read()
            .iter()
            .map(|(hash, location)| IndexEntry::new(*hash, *location))
            .collect();
        entries.sort_by_key(|entry| entry.location.offset);
        entries
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the block log path
    pub fn dat_path(&self) -> &Path {
        &self.dat_path
    }

    /// Get the index file path
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Report of the recovery pass run by `open`
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
