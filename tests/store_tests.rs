//! Tests for BlockStore
//!
//! These tests verify:
//! - Open on a fresh directory creates both files
//! - put/get round trips and hash precondition checks
//! - Idempotent puts that perform no I/O
//! - Offsets equal to the log length before each append
//! - Restart reproduces the same in-memory index
//! - Concurrent puts are serialized

use std::fs;
use std::sync::Arc;
use std::thread;

use blockstore::record::{frame, IndexEntry, INDEX_SIZE};
use blockstore::{
    Block, BlockCodec, BlockHeader, BlockLocation, BlockStore, ErrorKind, Hash256, PutOutcome,
    RawTransaction, StoreConfig, SyncStrategy,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, BlockStore<Block>) {
    let temp_dir = TempDir::new().unwrap();
    let store = BlockStore::open(config_for(&temp_dir)).unwrap();
    (temp_dir, store)
}

fn config_for(temp_dir: &TempDir) -> StoreConfig {
    StoreConfig::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build()
}

/// Deterministic block; `n` changes both header hash and payload size
fn make_block(n: u32) -> (Hash256, Block) {
    let header = BlockHeader {
        version: 1,
        prev_block_hash: Hash256::new([n as u8; 32]),
        merkle_root: Hash256::new([0x5A; 32]),
        time: 1_600_000_000 + n,
        bits: 0x207f_ffff,
        nonce: n,
    };
    let transactions = (0..=n % 4)
        .map(|i| RawTransaction(vec![i as u8; 10 + (n as usize) * 3]))
        .collect();
    let block = Block::new(header, transactions);
    (block.header_hash(), block)
}

fn file_len(path: &std::path::Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_fresh_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("chain");

    let store: BlockStore<Block> =
        BlockStore::open(StoreConfig::builder().data_dir(&data_dir).build()).unwrap();

    assert!(data_dir.join("blocks.dat").exists());
    assert!(data_dir.join("blocks.index").exists());
    assert_eq!(file_len(store.dat_path()), 0);
    assert_eq!(file_len(store.index_path()), 0);
    assert!(store.is_empty());
    assert!(store.recovery_report().is_clean());
}

#[test]
fn test_open_custom_filenames() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder()
        .data_dir(temp_dir.path())
        .dat_filename("chain.log")
        .index_filename("chain.idx")
        .build();

    let store: BlockStore<Block> = BlockStore::open(config).unwrap();

    assert_eq!(store.dat_path(), temp_dir.path().join("chain.log"));
    assert_eq!(store.index_path(), temp_dir.path().join("chain.idx"));
    assert!(store.dat_path().exists());
}

#[test]
fn test_open_path_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let store: BlockStore<Block> = BlockStore::open_path(temp_dir.path()).unwrap();

    assert_eq!(store.config().sync_strategy, SyncStrategy::EveryWrite);
    assert!(temp_dir.path().join("blocks.dat").exists());
}

// =============================================================================
// Put / Get Tests
// =============================================================================

#[test]
fn test_put_get() {
    let (_temp, store) = setup_temp_store();
    let (hash, block) = make_block(1);

    let outcome = store.put(&hash, &block).unwrap();
    let length = block.encode().len() as u32;

    assert_eq!(outcome, PutOutcome::Stored(BlockLocation::new(0, length)));
    assert_eq!(store.get(&hash).unwrap(), Some(block.clone()));
    assert_eq!(store.get_raw(&hash).unwrap(), Some(block.encode()));
    assert!(store.contains(&hash));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_missing() {
    let (_temp, store) = setup_temp_store();
    let (hash, _) = make_block(9);

    assert_eq!(store.get(&hash).unwrap(), None);
    assert_eq!(store.get_raw(&hash).unwrap(), None);
    assert_eq!(store.location(&hash), None);
    assert!(!store.contains(&hash));
}

#[test]
fn test_put_writes_frame_and_index_record() {
    let (_temp, store) = setup_temp_store();
    let (hash, block) = make_block(2);
    store.put(&hash, &block).unwrap();

    let dat = fs::read(store.dat_path()).unwrap();
    assert_eq!(dat, frame::encode(&block.encode()).unwrap());

    let index = fs::read(store.index_path()).unwrap();
    assert_eq!(index.len(), INDEX_SIZE);
    let entry = IndexEntry::decode(&index).unwrap();
    assert_eq!(entry.hash, hash);
    assert_eq!(entry.location, BlockLocation::new(0, block.encode().len() as u32));
}

#[test]
fn test_put_rejects_hash_mismatch() {
    let (_temp, store) = setup_temp_store();
    let (_, block) = make_block(3);
    let (other_hash, _) = make_block(4);

    let err = store.put(&other_hash, &block).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(file_len(store.dat_path()), 0);
    assert_eq!(file_len(store.index_path()), 0);
    assert!(store.is_empty());
}

#[test]
fn test_put_rejects_zero_hash() {
    let (_temp, store) = setup_temp_store();
    let (_, block) = make_block(5);

    let err = store.put(&Hash256::zero(), &block).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument);
}

#[test]
fn test_put_is_idempotent() {
    let (_temp, store) = setup_temp_store();
    let (hash, block) = make_block(6);

    assert!(matches!(store.put(&hash, &block).unwrap(), PutOutcome::Stored(_)));
    let dat_len = file_len(store.dat_path());
    let index_len = file_len(store.index_path());

    assert_eq!(store.put(&hash, &block).unwrap(), PutOutcome::AlreadyPresent);

    assert_eq!(file_len(store.dat_path()), dat_len);
    assert_eq!(file_len(store.index_path()), index_len);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_put_offsets_follow_log_length() {
    let (_temp, store) = setup_temp_store();
    let blocks: Vec<(Hash256, Block)> = (10..13).map(make_block).collect();
    let lens: Vec<u64> = blocks.iter().map(|(_, b)| b.encode().len() as u64).collect();

    let mut offsets = Vec::new();
    for (hash, block) in &blocks {
        let before = file_len(store.dat_path());
        match store.put(hash, block).unwrap() {
            PutOutcome::Stored(location) => {
                assert_eq!(location.offset.get(), before);
                offsets.push(location.offset.get());
            }
            PutOutcome::AlreadyPresent => panic!("fresh hash reported as present"),
        }
    }

    let overhead = 8 + 4;
    assert_eq!(offsets[0], 0);
    assert_eq!(offsets[1], overhead + lens[0]);
    assert_eq!(offsets[2], overhead + lens[0] + overhead + lens[1]);
    assert_eq!(file_len(store.dat_path()), 3 * overhead + lens.iter().sum::<u64>());
    assert_eq!(file_len(store.index_path()), 3 * INDEX_SIZE as u64);
}

#[test]
fn test_entries_in_log_order() {
    let (_temp, store) = setup_temp_store();
    let blocks: Vec<(Hash256, Block)> = (20..30).map(make_block).collect();
    for (hash, block) in &blocks {
        store.put(hash, block).unwrap();
    }

    let entries = store.entries();
    assert_eq!(entries.len(), 10);
    for (entry, (hash, _)) in entries.iter().zip(&blocks) {
        assert_eq!(entry.hash, *hash);
    }
    for pair in entries.windows(2) {
        assert_eq!(pair[0].location.end(), pair[1].location.offset.get());
    }
}

// =============================================================================
// Restart Tests
// =============================================================================

#[test]
fn test_restart_reproduces_index() {
    let temp_dir = TempDir::new().unwrap();
    let (hash, block) = make_block(7);

    {
        let store: BlockStore<Block> = BlockStore::open(config_for(&temp_dir)).unwrap();
        assert!(store.is_empty());
        let outcome = store.put(&hash, &block).unwrap();
        assert!(matches!(outcome, PutOutcome::Stored(l) if l.offset.get() == 0));
    }

    let store: BlockStore<Block> = BlockStore::open(config_for(&temp_dir)).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.location(&hash),
        Some(BlockLocation::new(0, block.encode().len() as u32))
    );
    assert_eq!(store.get(&hash).unwrap(), Some(block));
    assert!(store.recovery_report().is_clean());
}

#[test]
fn test_restart_then_continue_appending() {
    let temp_dir = TempDir::new().unwrap();
    let (h1, b1) = make_block(1);
    let (h2, b2) = make_block(2);

    {
        let store: BlockStore<Block> = BlockStore::open(config_for(&temp_dir)).unwrap();
        store.put(&h1, &b1).unwrap();
    }

    let store: BlockStore<Block> = BlockStore::open(config_for(&temp_dir)).unwrap();
    assert_eq!(store.put(&h1, &b1).unwrap(), PutOutcome::AlreadyPresent);

    let expected_offset = 12 + b1.encode().len() as u64;
    match store.put(&h2, &b2).unwrap() {
        PutOutcome::Stored(location) => assert_eq!(location.offset.get(), expected_offset),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(store.get(&h1).unwrap(), Some(b1));
    assert_eq!(store.get(&h2).unwrap(), Some(b2));
}

#[test]
fn test_os_buffered_sync_strategy() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::OsBuffered)
        .build();
    let (hash, block) = make_block(8);

    {
        let store: BlockStore<Block> = BlockStore::open(config.clone()).unwrap();
        store.put(&hash, &block).unwrap();
    }

    let store: BlockStore<Block> = BlockStore::open(config).unwrap();
    assert_eq!(store.get(&hash).unwrap(), Some(block));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_puts_are_serialized() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<BlockStore<Block>> = Arc::new(BlockStore::open(config_for(&temp_dir)).unwrap());

    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..10u32 {
                    let (hash, block) = make_block(t * 100 + i);
                    store.put(&hash, &block).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 40);

    // Records tile the log with no gaps or overlaps
    let entries = store.entries();
    assert_eq!(entries[0].location.offset.get(), 0);
    for pair in entries.windows(2) {
        assert_eq!(pair[0].location.end(), pair[1].location.offset.get());
    }
    let last = entries.last().unwrap();
    assert_eq!(file_len(store.dat_path()), last.location.end());

    for entry in &entries {
        let block = store.get(&entry.hash).unwrap().unwrap();
        assert_eq!(block.header_hash(), entry.hash);
    }
}

#[test]
fn test_concurrent_duplicate_puts_store_once() {
    let temp_dir = TempDir::new().unwrap();
    let store: Arc<BlockStore<Block>> = Arc::new(BlockStore::open(config_for(&temp_dir)).unwrap());
    let (hash, block) = make_block(77);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let block = block.clone();
            thread::spawn(move || store.put(&hash, &block).unwrap())
        })
        .collect();
    let stored = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|outcome| matches!(outcome, PutOutcome::Stored(_)))
        .count();

    assert_eq!(stored, 1);
    assert_eq!(file_len(store.index_path()), INDEX_SIZE as u64);
}
