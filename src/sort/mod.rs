//! Sort Module
//!
//! Dual-order sorter: materializes the same record set in two total orders.
//!
//! ## Orders
//! - **By primary key**: ascending `id` (total, ids are unique)
//! - **By score**: descending `score_a`, ties ascending `id`
//!
//! Both orders come from one deterministic merge sort driven by an explicit
//! comparator. Equal `score_a` values are resolved by the id tie-break in the
//! comparator itself, never by input order.

mod merge;

use std::cmp::Ordering;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Result, ScoreDbError};
use crate::record::{Record, RecordFileWriter};

pub use merge::merge_sort_by;

/// Ascending primary key
pub fn compare_by_primary_key(a: &Record, b: &Record) -> Ordering {
    a.id.cmp(&b.id)
}

/// Descending `score_a`, then ascending `id`
///
/// Scores compare under the IEEE-754 total order, so two scores are equal
/// only when bit-identical (no tolerance).
pub fn compare_by_score_descending(a: &Record, b: &Record) -> Ordering {
    b.score_a
        .total_cmp(&a.score_a)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort ascending by primary key
pub fn sort_by_primary_key(records: Vec<Record>) -> Vec<Record> {
    merge_sort_by(records, compare_by_primary_key)
}

/// Sort descending by `score_a` with ascending-id tie-break
pub fn sort_by_score_descending(records: Vec<Record>) -> Vec<Record> {
    merge_sort_by(records, compare_by_score_descending)
}

/// Result of writing both sorted files
#[derive(Debug, Clone)]
pub struct SortOutput {
    /// Records written to each file
    pub record_count: u64,
    /// Time spent sorting and writing both files
    pub elapsed: Duration,
}

/// Sort `records` both ways and write each order to its own file.
///
/// Both files are written and fsynced under temporary names first; neither
/// is renamed into place until both passes are complete, so a failure
/// leaves the previous pair untouched.
pub fn write_sorted_files(
    records: Vec<Record>,
    primary_path: &Path,
    score_path: &Path,
) -> Result<SortOutput> {
    let start = Instant::now();

    let by_score = sort_by_score_descending(records.clone());
    let by_id = sort_by_primary_key(records);

    // Point queries and the score tie-break both rely on unique ids
    if let Some(pair) = by_id.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(ScoreDbError::Usage(format!(
            "duplicate primary key {}",
            pair[0].id
        )));
    }

    let mut primary = RecordFileWriter::new(primary_path)?;
    let mut score = RecordFileWriter::new(score_path)?;
    for record in &by_id {
        primary.add(record)?;
    }
    for record in &by_score {
        score.add(record)?;
    }
    primary.sync()?;
    score.sync()?;

    let record_count = primary.finish()?;
    score.finish()?;

    let elapsed = start.elapsed();
    tracing::info!(
        records = record_count,
        elapsed_ms = elapsed.as_millis() as u64,
        "Wrote {} and {}",
        primary_path.display(),
        score_path.display()
    );

    Ok(SortOutput {
        record_count,
        elapsed,
    })
}
