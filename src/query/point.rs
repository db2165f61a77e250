//! Point Query Engine

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Producer, Result};
use crate::record::{Record, RecordReader};

/// Result of a primary-key lookup
#[derive(Debug, Clone)]
pub struct PointQueryResult {
    /// Requested key
    pub id: i32,
    /// The record, or `None` if not found
    pub record: Option<Record>,
    /// Records decoded before the scan stopped
    pub scanned: u64,
    pub elapsed: Duration,
}

impl PointQueryResult {
    pub fn found(&self) -> bool {
        self.record.is_some()
    }
}

impl fmt::Display for PointQueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => writeln!(f, "{}", record)?,
            None => writeln!(f, "no record with id {}", self.id)?,
        }
        write!(f, "elapsed: {} ms", self.elapsed.as_millis())
    }
}

/// Look up `id` in the id-ordered file.
///
/// The scan stops at the first record whose id exceeds `id`, which is
/// only valid because the file is ascending by id.
pub fn query_point(primary_path: &Path, id: i32) -> Result<PointQueryResult> {
    let start = Instant::now();
    let mut reader = RecordReader::open(primary_path, Producer::Sorter)?;

    let mut found = None;
    let mut scanned = 0u64;
    while let Some(record) = reader.next_record()? {
        scanned += 1;
        if record.id == id {
            found = Some(record);
            break;
        }
        if record.id > id {
            break;
        }
    }

    let elapsed = start.elapsed();
    tracing::debug!(id, found = found.is_some(), scanned, "Point query");

    Ok(PointQueryResult {
        id,
        record: found,
        scanned,
        elapsed,
    })
}
