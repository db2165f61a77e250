//! Record Reader
//!
//! Sequential access to a record file, optionally starting at a byte offset.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{Producer, Result, ScoreDbError};

use super::{Record, RECORD_SIZE};

/// Sequential reader over fixed-size records
///
/// End of file exactly on a record boundary ends the stream; a trailing
/// partial record is reported as `CorruptData` with its byte offset.
pub struct RecordReader {
    /// Path, kept for error messages
    path: PathBuf,
    /// Buffered file handle, released when the reader is dropped
    file: BufReader<File>,
    /// Offset of the next record to be read
    offset: u64,
    /// File length captured at open
    len: u64,
}

impl RecordReader {
    /// Open a record file at offset 0
    pub fn open(path: &Path, producer: Producer) -> Result<Self> {
        Self::open_at(path, 0, producer)
    }

    /// Open a record file positioned at `offset`
    ///
    /// `offset` must fall on a record boundary inside the file (or at its end).
    pub fn open_at(path: &Path, offset: u64, producer: Producer) -> Result<Self> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScoreDbError::missing(path, producer));
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();

        if offset % RECORD_SIZE as u64 != 0 {
            return Err(ScoreDbError::corrupt(
                path,
                offset,
                format!("offset is not a multiple of the {}-byte record size", RECORD_SIZE),
            ));
        }
        if offset > len {
            return Err(ScoreDbError::corrupt(
                path,
                offset,
                format!("offset is past end of file ({} bytes)", len),
            ));
        }

        let mut file = BufReader::new(file);
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            offset,
            len,
        })
    }

    /// Offset of the next record
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// File length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left after the current offset
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.offset)
    }

    /// Read the next record
    ///
    /// Returns:
    /// - `Ok(Some(record))`: a full record was decoded
    /// - `Ok(None)`: end of file on a record boundary
    /// - `Err(CorruptData)`: fewer than 20 bytes remain mid-record
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < RECORD_SIZE as u64 {
            return Err(self.partial_record(remaining));
        }

        let mut buf = [0u8; RECORD_SIZE];
        if let Err(e) = self.file.read_exact(&mut buf) {
            // File shrank underneath us
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(ScoreDbError::corrupt(
                    &self.path,
                    self.offset,
                    "unexpected end of file inside a record",
                ));
            }
            return Err(e.into());
        }

        self.offset += RECORD_SIZE as u64;
        Ok(Some(Record::decode(&buf)))
    }

    fn partial_record(&self, remaining: u64) -> ScoreDbError {
        ScoreDbError::corrupt(
            &self.path,
            self.offset,
            format!("partial record: {} of {} bytes", remaining, RECORD_SIZE),
        )
    }
}

impl Iterator for RecordReader {
    /// (byte offset of the record, record)
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        match self.next_record() {
            Ok(Some(record)) => Some(Ok((offset, record))),
            Ok(None) => None,
            Err(e) => {
                // Fuse after an error so callers using `collect` stop cleanly
                self.offset = self.len;
                Some(Err(e))
            }
        }
    }
}
