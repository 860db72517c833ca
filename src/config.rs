//! Configuration for the block store
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a block store instance
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── blocks.dat       (append-only framed block log)
    ///     └── blocks.index     (fixed 44-byte index records)
    pub data_dir: PathBuf,

    /// File name of the block log inside `data_dir`
    pub dat_filename: String,

    /// File name of the index inside `data_dir`
    pub index_filename: String,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How each put is flushed to stable storage
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Recovery Configuration
    // -------------------------------------------------------------------------
    /// Whether the loaded index is checked against the recovered log
    pub index_verification: IndexVerification,
}

/// Sync strategy for appends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the log before the index append, then fsync the index
    EveryWrite,

    /// Leave flushing to the OS (appends still happen log first)
    OsBuffered,
}

/// Index verification performed by `open`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexVerification {
    /// Cross-check index entries against the recovered log, drop dangling
    /// entries and re-index records the index is missing
    Reconcile,

    /// Load the index as-is once it has been cut to whole records
    Trust,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            dat_filename: "blocks.dat".to_string(),
            index_filename: "blocks.index".to_string(),
            sync_strategy: SyncStrategy::EveryWrite,
            index_verification: IndexVerification::Reconcile,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Full path of the block log
    pub fn dat_path(&self) -> PathBuf {
        self.data_dir.join(&self.dat_filename)
    }

    /// Full path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_filename)
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the block log file name
    pub fn dat_filename(mut self, name: impl Into<String>) -> Self {
        self.config.dat_filename = name.into();
        self
    }

    /// Set the index file name
    pub fn index_filename(mut self, name: impl Into<String>) -> Self {
        self.config.index_filename = name.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the index verification mode
    pub fn index_verification(mut self, mode: IndexVerification) -> Self {
        self.config.index_verification = mode;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
