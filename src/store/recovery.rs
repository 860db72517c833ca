//! Startup Recovery
//!
//! Rebuilds trust in both store files before any request is served.
//!
//! 1. Scan the log from offset 0; the first record that fails to decode
//!    marks the end of the valid log and everything after it is cut off.
//! 2. Cut the index down to a whole number of 44-byte records and load it.
//! 3. Optionally reconcile the index against the records the scan accepted:
//!    an entry survives only if the block stored at its offset hashes to
//!    the entry's key.
//!
//! Corruption found here never surfaces as an error: it becomes a
//! truncation and is reported through [`RecoveryReport`].

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{info, warn};

use crate::block::BlockCodec;
use crate::config::{IndexVerification, StoreConfig};
use crate::error::{Result, StoreError};
use crate::record::{frame, IndexEntry, FRAME_HEADER_SIZE, INDEX_SIZE};
use crate::types::{BlockLocation, Hash256};

use super::files;

/// Index records read per buffered chunk
const INDEX_READ_BATCH: usize = 1024;

/// Outcome of a recovery pass
///
/// In read-only verification the counters describe what a repairing open
/// would do; no file is changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Valid records found in the log
    pub records_scanned: u64,

    /// Bytes cut from the tail of the log
    pub log_bytes_truncated: u64,

    /// Why the log scan stopped before the end of the file
    pub log_stop_reason: Option<String>,

    /// Entries in the in-memory index after recovery
    pub index_entries_loaded: u64,

    /// Partial-record bytes cut from the tail of the index
    pub index_bytes_truncated: u64,

    /// Index entries that did not resolve to a log record, or repeated a hash
    pub index_entries_dropped: u64,

    /// Log records re-indexed because the index was missing them
    pub index_entries_rebuilt: u64,

    /// Log records that could not be re-indexed
    pub orphaned_records: u64,

    /// Whether the index file was rewritten
    pub index_rewritten: bool,
}

impl RecoveryReport {
    /// True when recovery found nothing to repair
    pub fn is_clean(&self) -> bool {
        self.log_bytes_truncated == 0
            && self.index_bytes_truncated == 0
            && self.index_entries_dropped == 0
            && self.index_entries_rebuilt == 0
            && self.orphaned_records == 0
            && !self.index_rewritten
    }
}

/// Recovered in-memory index plus the report describing how it was obtained
pub(crate) struct Recovered {
    pub map: HashMap<Hash256, BlockLocation>,
    pub report: RecoveryReport,
}

/// Run the full recovery sequence; `repair` decides whether files are modified
pub(crate) fn recover<B: BlockCodec>(config: &StoreConfig, repair: bool) -> Result<Recovered> {
    let dat_path = config.dat_path();
    let index_path = config.index_path();
    let mut report = RecoveryReport::default();

    // Log pass
    let scan = scan_log::<B>(&dat_path)?;
    report.records_scanned = scan.records.len() as u64;
    report.log_bytes_truncated = scan.file_len - scan.valid_len;
    report.log_stop_reason = scan.stop_reason.clone();
    if scan.valid_len < scan.file_len {
        warn!(
            path = %dat_path.display(),
            valid_len = scan.valid_len,
            file_len = scan.file_len,
            reason = scan.stop_reason.as_deref().unwrap_or_default(),
            "discarding unreadable tail of block log"
        );
        if repair {
            files::truncate(&dat_path, scan.valid_len)?;
        }
    }

    // Index pass
    let load = load_index(&index_path)?;
    report.index_bytes_truncated = load.file_len - load.valid_len;
    if load.valid_len < load.file_len {
        warn!(
            path = %index_path.display(),
            valid_len = load.valid_len,
            file_len = load.file_len,
            "discarding partial record at tail of index"
        );
        if repair {
            files::truncate(&index_path, load.valid_len)?;
        }
    }

    let reconciled = match config.index_verification {
        IndexVerification::Reconcile => reconcile(&scan, load.entries),
        IndexVerification::Trust => trust(load.entries),
    };
    report.index_entries_dropped = reconciled.dropped;
    report.index_entries_rebuilt = reconciled.rebuilt;
    report.orphaned_records = reconciled.orphaned;

    if reconciled.needs_rewrite() {
        let mut bytes = Vec::with_capacity(reconciled.entries.len() * INDEX_SIZE);
        for entry in &reconciled.entries {
            bytes.extend_from_slice(&entry.encode());
        }
        if repair {
            files::replace(&index_path, &bytes)?;
            info!(
                path = %index_path.display(),
                entries = reconciled.entries.len(),
                "rewrote index from recovered log"
            );
        }
        report.index_rewritten = true;
    }

    let map: HashMap<Hash256, BlockLocation> = reconciled
        .entries
        .into_iter()
        .map(|entry| (entry.hash, entry.location))
        .collect();
    report.index_entries_loaded = map.len() as u64;

    Ok(Recovered { map, report })
}

// =============================================================================
// Log Scan
// =============================================================================

/// A record accepted by the log scan
pub(crate) struct ScannedRecord {
    pub location: BlockLocation,

    /// Header hash of the stored block; `None` when the payload does not decode
    pub hash: Option<Hash256>,
}

/// Records accepted by a sequential scan of the block log
pub(crate) struct LogScan {
    pub records: Vec<ScannedRecord>,
    pub valid_len: u64,
    pub file_len: u64,
    pub stop_reason: Option<String>,
}

/// Scan the log from the start, stopping at the first record that fails
///
/// Each accepted payload is decoded once to learn the hash it is stored under.
pub(crate) fn scan_log<B: BlockCodec>(path: &Path) -> Result<LogScan> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut pos = 0u64;
    let mut stop_reason = None;

    while pos < file_len {
        match next_record(&mut reader, file_len - pos) {
            Ok(payload) => {
                let location = BlockLocation::new(pos, payload.len() as u32);
                let hash = B::decode(&payload).ok().map(|block| block.header_hash());
                pos = location.end();
                records.push(ScannedRecord { location, hash });
            }
            Err(e) if e.is_corruption() => {
                stop_reason = Some(format!("{} (log offset {})", e, pos));
                break;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(LogScan {
        records,
        valid_len: pos,
        file_len,
        stop_reason,
    })
}

/// Read and fully validate the record at the reader's position, returning
/// its payload
///
/// Never reads past `remaining`, so a garbage length cannot force a huge
/// allocation.
fn next_record<R: Read>(reader: &mut R, remaining: u64) -> Result<Vec<u8>> {
    let header_len = remaining.min(FRAME_HEADER_SIZE as u64) as usize;
    let mut buf = vec![0u8; header_len];
    reader.read_exact(&mut buf)?;

    let length = frame::read_header(&buf, 0)?;

    let available = remaining.min(frame::record_len(length)) as usize;
    buf.resize(available, 0);
    reader.read_exact(&mut buf[FRAME_HEADER_SIZE..])?;

    Ok(frame::decode_at(&buf, 0)?.payload)
}

/// Read the payload of the record at `location`
pub(crate) fn read_record(path: &Path, location: &BlockLocation) -> Result<Vec<u8>> {
    let bytes = files::read_at(path, location.offset.get(), location.record_len() as usize)?;
    let decoded = frame::decode_at(&bytes, 0)?;

    let found = decoded.payload.len() as u32;
    if found != location.length.get() {
        return Err(StoreError::IndexMismatch {
            offset: location.offset.get(),
            expected: location.length.get(),
            found,
        });
    }
    Ok(decoded.payload)
}

// =============================================================================
// Index Load
// =============================================================================

/// Whole index records in file order
pub(crate) struct IndexLoad {
    pub entries: Vec<IndexEntry>,
    pub valid_len: u64,
    pub file_len: u64,
}

/// Load every whole 44-byte record; a trailing partial record is ignored
pub(crate) fn load_index(path: &Path) -> Result<IndexLoad> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let count = file_len / INDEX_SIZE as u64;
    let valid_len = count * INDEX_SIZE as u64;

    let mut reader = BufReader::with_capacity(INDEX_SIZE * INDEX_READ_BATCH, file);
    let mut entries = Vec::with_capacity(count as usize);
    let mut record = [0u8; INDEX_SIZE];
    for _ in 0..count {
        reader.read_exact(&mut record)?;
        entries.push(IndexEntry::decode(&record)?);
    }

    Ok(IndexLoad {
        entries,
        valid_len,
        file_len,
    })
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Index entries accepted for the in-memory map, ordered by offset
pub(crate) struct Reconciled {
    pub entries: Vec<IndexEntry>,
    pub dropped: u64,
    pub rebuilt: u64,
    pub orphaned: u64,
}

impl Reconciled {
    fn needs_rewrite(&self) -> bool {
        self.dropped > 0 || self.rebuilt > 0
    }
}

/// Keep only index entries backed by a scanned record holding the block
/// with that hash, then re-index any scanned record the index does not claim
pub(crate) fn reconcile(scan: &LogScan, loaded: Vec<IndexEntry>) -> Reconciled {
    let by_offset: HashMap<u64, &ScannedRecord> = scan
        .records
        .iter()
        .map(|record| (record.location.offset.get(), record))
        .collect();

    let mut seen: HashSet<Hash256> = HashSet::new();
    let mut claimed: HashSet<u64> = HashSet::new();
    let mut entries = Vec::with_capacity(scan.records.len());
    let mut dropped = 0u64;

    for entry in loaded {
        let offset = entry.location.offset.get();
        let record = match by_offset.get(&offset) {
            Some(record) if record.location.length == entry.location.length => record,
            _ => {
                warn!(
                    hash = %entry.hash,
                    offset,
                    length = entry.location.length.get(),
                    "dropping index entry that does not resolve to a log record"
                );
                dropped += 1;
                continue;
            }
        };
        if record.hash != Some(entry.hash) {
            warn!(
                hash = %entry.hash,
                offset,
                "dropping index entry whose log record holds a different block"
            );
            dropped += 1;
            continue;
        }
        if seen.contains(&entry.hash) || claimed.contains(&offset) {
            warn!(hash = %entry.hash, offset, "dropping duplicate index entry");
            dropped += 1;
            continue;
        }
        seen.insert(entry.hash);
        claimed.insert(offset);
        entries.push(entry);
    }

    let mut rebuilt = 0u64;
    let mut orphaned = 0u64;
    for record in scan
        .records
        .iter()
        .filter(|r| !claimed.contains(&r.location.offset.get()))
    {
        let offset = record.location.offset.get();
        match record.hash {
            Some(hash) if seen.insert(hash) => {
                entries.push(IndexEntry::new(hash, record.location));
                rebuilt += 1;
            }
            Some(hash) => {
                warn!(%hash, offset, "log record repeats an indexed hash");
                orphaned += 1;
            }
            None => {
                warn!(offset, "cannot re-index undecodable log record");
                orphaned += 1;
            }
        }
    }

    if rebuilt > 0 {
        info!(rebuilt, "re-indexed log records missing from index");
    }

    entries.sort_by_key(|entry| entry.location.offset);
    Reconciled {
        entries,
        dropped,
        rebuilt,
        orphaned,
    }
}

/// Take the index as stored; a repeated hash keeps its first entry
pub(crate) fn trust(loaded: Vec<IndexEntry>) -> Reconciled {
    let mut seen: HashSet<Hash256> = HashSet::new();
    let mut entries = Vec::with_capacity(loaded.len());
    for entry in loaded {
        if seen.insert(entry.hash) {
            entries.push(entry);
        } else {
            warn!(hash = %entry.hash, "ignoring repeated hash in index");
        }
    }
    Reconciled {
        entries,
        dropped: 0,
        rebuilt: 0,
        orphaned: 0,
    }
}
