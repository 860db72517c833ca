//! Benchmarks for blockstore codec and storage operations

use blockstore::codec::varint;
use blockstore::record::frame;
use blockstore::{Block, BlockCodec, BlockHeader, BlockStore, Hash256, RawTransaction, StoreConfig, SyncStrategy};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

const TX_COUNT: usize = 50;
const TX_SIZE: usize = 250;

fn make_block(nonce: u32) -> Block {
    let header = BlockHeader {
        version: 1,
        prev_block_hash: Hash256::zero(),
        merkle_root: Hash256::new([7u8; 32]),
        time: 1_700_000_000,
        bits: 0x1d00_ffff,
        nonce,
    };
    let transactions = (0..TX_COUNT)
        .map(|i| RawTransaction(vec![i as u8; TX_SIZE]))
        .collect();
    Block::new(header, transactions)
}

fn varint_benchmarks(c: &mut Criterion) {
    let values = [0u64, 252, 253, 0xFFFF, 0x1_0000, 0xFFFF_FFFF, u64::MAX];
    let encoded: Vec<Vec<u8>> = values.iter().map(|v| varint::encode(*v)).collect();

    c.bench_function("varint_encode", |b| {
        b.iter(|| {
            for v in &values {
                black_box(varint::encode(black_box(*v)));
            }
        })
    });

    c.bench_function("varint_decode", |b| {
        b.iter(|| {
            for bytes in &encoded {
                black_box(varint::decode(black_box(bytes), 0).unwrap());
            }
        })
    });
}

fn frame_benchmarks(c: &mut Criterion) {
    let payload = make_block(0).encode();
    let record = frame::encode(&payload).unwrap();

    c.bench_function("frame_encode_13k", |b| {
        b.iter(|| black_box(frame::encode(black_box(&payload)).unwrap()))
    });

    c.bench_function("frame_decode_13k", |b| {
        b.iter(|| black_box(frame::decode_at(black_box(&record), 0).unwrap()))
    });
}

fn store_benchmarks(c: &mut Criterion) {
    let blocks: Vec<(Hash256, Block)> = (0..100)
        .map(|n| {
            let block = make_block(n);
            (block.header_hash(), block)
        })
        .collect();

    c.bench_function("store_put_100_nosync", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let config = StoreConfig::builder()
                    .data_dir(dir.path())
                    .sync_strategy(SyncStrategy::OsBuffered)
                    .build();
                let store = BlockStore::<Block>::open(config).unwrap();
                (dir, store)
            },
            |(_dir, store)| {
                for (hash, block) in &blocks {
                    store.put(hash, block).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, varint_benchmarks, frame_benchmarks, store_benchmarks);
criterion_main!(benches);
