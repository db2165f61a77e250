//! Range Query Engine
//!
//! Two-stage lookup: integer key bounds pick a byte window from the index,
//! then an exact filter runs over the records inside that window.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Producer, Result, ScoreDbError};
use crate::index::{IndexFile, IndexMeta, ScanWindow, SourceStamp};
use crate::record::{truncate_score, Record, RecordReader};

/// Result of a score range query
#[derive(Debug, Clone)]
pub struct RangeQueryResult {
    pub min_score: f32,
    pub max_score: f32,
    /// `trunc(min_score)`
    pub min_key: i32,
    /// `ceil(max_score)`
    pub max_key: i32,
    /// Byte window chosen from the index (`None` = nothing to scan)
    pub window: Option<ScanWindow>,
    /// Matching records in file (descending score) order
    pub records: Vec<Record>,
    /// Records decoded while scanning the window
    pub scanned: u64,
    pub elapsed: Duration,
}

impl RangeQueryResult {
    /// Number of matching records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Mean `score_a` of the matches, 0 when there are none
    pub fn average(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: f64 = self.records.iter().map(|r| r.score_a as f64).sum();
        total / self.records.len() as f64
    }
}

impl fmt::Display for RangeQueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "range: [{}, {}]", self.min_score, self.max_score)?;
        writeln!(f, "count: {}", self.count())?;
        writeln!(f, "average: {:.2}", self.average())?;
        write!(f, "elapsed: {} ms", self.elapsed.as_millis())
    }
}

/// Reject bounds that cannot describe a range. No file I/O happens here.
pub fn validate_range(min_score: f32, max_score: f32) -> Result<()> {
    if min_score.is_nan() || max_score.is_nan() {
        return Err(ScoreDbError::Usage("score bounds must be numbers".to_string()));
    }
    if min_score > max_score {
        return Err(ScoreDbError::Usage(format!(
            "min score {} is greater than max score {}",
            min_score, max_score
        )));
    }
    Ok(())
}

/// Integer bounds for the index lookup: `(trunc(min), ceil(max))`.
///
/// These over-fetch on purpose (89.5 admits the whole 89 bucket); the
/// exact filter in the scan removes the extra records.
pub fn key_bounds(min_score: f32, max_score: f32) -> (i32, i32) {
    (truncate_score(min_score), max_score.ceil() as i32)
}

/// Return every record of the score-ordered file with
/// `min_score <= score_a <= max_score`, in file order.
///
/// With `meta_path` set and a sidecar present, the score file's length,
/// modification time and inode are checked against the ones the index was
/// built from before scanning.
pub fn query_range(
    index_path: &Path,
    score_path: &Path,
    meta_path: Option<&Path>,
    min_score: f32,
    max_score: f32,
) -> Result<RangeQueryResult> {
    validate_range(min_score, max_score)?;
    let start = Instant::now();

    let index = IndexFile::load(index_path)?;
    let source = match fs::metadata(score_path) {
        Ok(m) => SourceStamp::from_metadata(&m),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ScoreDbError::missing(score_path, Producer::Sorter));
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(meta_path) = meta_path {
        if let Some(meta) = IndexMeta::load(meta_path)? {
            meta.check_source(&source, score_path)?;
        }
    }

    let (min_key, max_key) = key_bounds(min_score, max_score);
    let window = index.scan_window(min_key, max_key);

    tracing::debug!(
        min_score,
        max_score,
        min_key,
        max_key,
        ?window,
        "Range query window"
    );

    let mut result = RangeQueryResult {
        min_score,
        max_score,
        min_key,
        max_key,
        window,
        records: Vec::new(),
        scanned: 0,
        elapsed: Duration::ZERO,
    };

    if let Some(window) = window {
        scan_window(score_path, window, &mut result)?;
    }

    result.elapsed = start.elapsed();
    Ok(result)
}

/// Bounded scan of `window`, appending matches to `result`
fn scan_window(score_path: &Path, window: ScanWindow, result: &mut RangeQueryResult) -> Result<()> {
    let mut reader = RecordReader::open_at(score_path, window.start, Producer::Sorter)?;

    loop {
        if window.end.is_some_and(|end| reader.offset() >= end) {
            break;
        }
        let Some(record) = reader.next_record()? else {
            break;
        };
        result.scanned += 1;

        // Descending file: once below min_key nothing further can match
        if record.score_key() < result.min_key {
            break;
        }

        if record.score_a >= result.min_score && record.score_a <= result.max_score {
            result.records.push(record);
        }
    }

    Ok(())
}
