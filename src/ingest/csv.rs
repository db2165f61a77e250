//! CSV parsing for the record source file

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, ScoreDbError};
use crate::record::Record;

/// Minimum number of comma-separated fields in a data row
const MIN_FIELDS: usize = 5;

/// A data row that was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source (the header is line 1)
    pub line: usize,
    pub reason: String,
}

/// Records accepted from a CSV source plus the rows that were dropped
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse one data row.
///
/// `line` is only used to label the error.
pub fn parse_row(row: &str, line: usize) -> Result<Record> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return Err(ScoreDbError::MalformedRow {
            line,
            reason: format!("expected at least {} fields, got {}", MIN_FIELDS, fields.len()),
        });
    }

    let id = fields[0].parse::<i32>().map_err(|e| ScoreDbError::MalformedRow {
        line,
        reason: format!("invalid id {:?}: {}", fields[0], e),
    })?;

    let mut scores = [0f32; 4];
    for (slot, field) in scores.iter_mut().zip(&fields[1..MIN_FIELDS]) {
        let value = field.parse::<f32>().map_err(|e| ScoreDbError::MalformedRow {
            line,
            reason: format!("invalid score {:?}: {}", field, e),
        })?;
        if !value.is_finite() {
            return Err(ScoreDbError::MalformedRow {
                line,
                reason: format!("score {:?} is not finite", field),
            });
        }
        *slot = value;
    }

    Ok(Record::new(id, scores[0], scores[1], scores[2], scores[3]))
}

/// Parse a CSV stream: header discarded, malformed rows skipped with a warning
pub fn parse_csv<R: BufRead>(reader: R) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;

        if line_no == 1 {
            // Header; may carry a UTF-8 BOM
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line, line_no) {
            Ok(record) => report.records.push(record),
            Err(ScoreDbError::MalformedRow { line, reason }) => {
                tracing::warn!(line, %reason, "Skipping malformed row");
                report.skipped.push(SkippedRow { line, reason });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Read and parse the CSV file at `path`
pub fn load_csv(path: &Path) -> Result<IngestReport> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ScoreDbError::Usage(format!("CSV source not found: {}", path.display()))
        } else {
            ScoreDbError::Io(e)
        }
    })?;

    let report = parse_csv(BufReader::new(file))?;
    tracing::info!(
        records = report.records.len(),
        skipped = report.skipped.len(),
        "Parsed {}",
        path.display()
    );
    Ok(report)
}
