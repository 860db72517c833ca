//! blockstore Inspection Tool
//!
//! Offline verification, repair and lookup over a block data directory.

use std::process;

use blockstore::{Block, BlockStore, Hash256, RecoveryReport, StoreConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// blockstore inspector
#[derive(Parser, Debug)]
#[command(name = "blockstore-inspect")]
#[command(about = "Inspect and repair a block store data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan both files and report problems without modifying them
    Verify,

    /// Open the store, truncating and reconciling as needed
    Repair,

    /// List every indexed block in log order (read-only)
    List,

    /// Show a stored block (read-only)
    Get {
        /// Block hash (64 hex characters)
        hash: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,blockstore=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let config = StoreConfig::builder().data_dir(&args.data_dir).build();

    if let Err(e) = run(config, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(config: StoreConfig, command: Commands) -> blockstore::Result<()> {
    match command {
        Commands::Verify => {
            let report = BlockStore::<Block>::verify(&config)?;
            print_report(&report);
        }
        Commands::Repair => {
            let store = BlockStore::<Block>::open(config)?;
            print_report(store.recovery_report());
        }
        Commands::List => {
            let store = BlockStore::<Block>::open_read_only(config)?;
            for entry in store.entries() {
                println!(
                    "{}  offset={}  length={}",
                    entry.hash, entry.location.offset, entry.location.length
                );
            }
        }
        Commands::Get { hash } => {
            let hash = Hash256::from_hex(&hash)?;
            let store = BlockStore::<Block>::open_read_only(config)?;
            match store.get(&hash)? {
                Some(block) => {
                    let header = &block.header;
                    println!("hash:         {}", hash);
                    println!("version:      {}", header.version);
                    println!("prev_block:   {}", header.prev_block_hash);
                    println!("merkle_root:  {}", header.merkle_root);
                    println!("time:         {}", header.time);
                    println!("bits:         0x{:08x}", header.bits);
                    println!("nonce:        {}", header.nonce);
                    println!("transactions: {}", block.transactions.len());
                }
                None => println!("not found: {}", hash),
            }
        }
    }
    Ok(())
}

fn print_report(report: &RecoveryReport) {
    println!("records scanned:        {}", report.records_scanned);
    println!("log bytes truncated:    {}", report.log_bytes_truncated);
    if let Some(reason) = &report.log_stop_reason {
        println!("log scan stopped:       {}", reason);
    }
    println!("index entries loaded:   {}", report.index_entries_loaded);
    println!("index bytes truncated:  {}", report.index_bytes_truncated);
    println!("index entries dropped:  {}", report.index_entries_dropped);
    println!("index entries rebuilt:  {}", report.index_entries_rebuilt);
    println!("orphaned records:       {}", report.orphaned_records);
    println!("index rewritten:        {}", report.index_rewritten);
    println!("clean:                  {}", report.is_clean());
}
