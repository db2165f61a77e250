//! Index verification
//!
//! Full cross-check of an index against the score-ordered file it claims
//! to describe.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Producer, Result};
use crate::record::RecordReader;

use super::{IndexFile, IndexMeta};

/// Outcome of [`verify_index`]
#[derive(Debug, Clone, Default)]
pub struct IndexVerification {
    /// Index entries compared
    pub entries_checked: usize,
    /// Records read from the score file
    pub records_scanned: u64,
    /// CRC32 of the score file as it is now
    pub source_crc32: u32,
    /// `Some(true)` if the sidecar matches the score file, `None` without sidecar
    pub meta_matches: Option<bool>,
    /// Human-readable mismatches, empty when the index is sound
    pub problems: Vec<String>,
}

impl IndexVerification {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Rescan `score_path` and compare it with the index at `index_path`.
///
/// Checks that the index holds exactly one entry per distinct truncated
/// score, each pointing at the first record with that key, and that the
/// sidecar (if any) fingerprints the current score file.
pub fn verify_index(
    index_path: &Path,
    score_path: &Path,
    meta_path: Option<&Path>,
) -> Result<IndexVerification> {
    let index = IndexFile::load(index_path)?;

    let mut first_seen: BTreeMap<i32, u64> = BTreeMap::new();
    let mut hasher = crc32fast::Hasher::new();
    let mut report = IndexVerification::default();

    let reader = RecordReader::open(score_path, Producer::Sorter)?;
    for item in reader {
        let (offset, record) = item?;
        hasher.update(&record.to_bytes());
        first_seen.entry(record.score_key()).or_insert(offset);
        report.records_scanned += 1;
    }
    report.source_crc32 = hasher.finalize();

    for entry in index.entries() {
        report.entries_checked += 1;
        match first_seen.get(&entry.key) {
            Some(&expected) if expected == entry.offset => {}
            Some(&expected) => report.problems.push(format!(
                "key {} points at offset {}, first record with that key is at {}",
                entry.key, entry.offset, expected
            )),
            None => report.problems.push(format!(
                "key {} has no record in {}",
                entry.key,
                score_path.display()
            )),
        }
    }
    for key in first_seen.keys() {
        if index.offset_of(*key).is_none() {
            report.problems.push(format!("key {} missing from index", key));
        }
    }

    if let Some(meta_path) = meta_path {
        if let Some(meta) = IndexMeta::load(meta_path)? {
            let source_len = report.records_scanned * crate::record::RECORD_SIZE as u64;
            let matches = meta.source_len == source_len && meta.source_crc32 == report.source_crc32;
            if meta.node_count as usize != index.len() || meta.tree_height as i32 != index.tree_height() {
                report.problems.push(format!(
                    "metadata describes {} nodes (height {}), index header has {} (height {})",
                    meta.node_count,
                    meta.tree_height,
                    index.len(),
                    index.tree_height()
                ));
            }
            if !matches {
                report.problems.push(format!(
                    "metadata fingerprint (len={}, crc={:08x}) does not match score file (len={}, crc={:08x})",
                    meta.source_len, meta.source_crc32, source_len, report.source_crc32
                ));
            }
            report.meta_matches = Some(matches);
        }
    }

    tracing::debug!(
        entries = report.entries_checked,
        records = report.records_scanned,
        problems = report.problems.len(),
        "Verified index {}",
        index_path.display()
    );

    Ok(report)
}
