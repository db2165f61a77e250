//! Record File Writer
//!
//! Writes records in caller order to a new record file.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::storage::AtomicFile;

use super::Record;

/// Builder for record files (must be fed in the desired file order)
pub struct RecordFileWriter {
    /// Temp-file-backed output, published on `finish()`
    file: AtomicFile,
    /// Number of records written
    record_count: u64,
}

impl RecordFileWriter {
    /// Create a new record file writer
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            file: AtomicFile::create(path)?,
            record_count: 0,
        })
    }

    /// Append one record
    pub fn add(&mut self, record: &Record) -> Result<()> {
        self.file.write_all(&record.to_bytes())?;
        self.record_count += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Make the written records durable without publishing the file
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync()
    }

    /// Flush everything and publish the file. Returns the record count.
    pub fn finish(self) -> Result<u64> {
        tracing::debug!(
            records = self.record_count,
            bytes = self.file.bytes_written(),
            "Publishing {}",
            self.file.path().display()
        );
        self.file.finish()?;
        Ok(self.record_count)
    }
}

/// Write `records` to `path` in slice order
pub fn write_records(path: &Path, records: &[Record]) -> Result<u64> {
    let mut writer = RecordFileWriter::new(path)?;
    for record in records {
        writer.add(record)?;
    }
    writer.finish()
}
