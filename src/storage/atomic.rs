//! Atomic file writer
//!
//! Writes to `<path>.tmp` and renames over `<path>` only after the complete
//! content has been flushed and fsynced. A writer dropped before `finish()`
//! removes its temp file and leaves any previous `<path>` untouched.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScoreDbError};

/// Suffix appended to the target path while a write is in progress
pub const TEMP_SUFFIX: &str = ".tmp";

/// Buffered writer that publishes its file with a rename on `finish()`
pub struct AtomicFile {
    /// Final destination
    path: PathBuf,
    /// In-progress destination
    tmp_path: PathBuf,
    /// Buffered writer over the temp file (None once finished)
    writer: Option<BufWriter<File>>,
    /// Bytes written so far
    bytes_written: u64,
}

impl AtomicFile {
    /// Create the temp file next to `path`
    pub fn create(path: &Path) -> Result<Self> {
        let tmp_path = temp_path_for(path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer: Some(BufWriter::new(file)),
            bytes_written: 0,
        })
    }

    /// Final path this writer publishes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and fsync the temp file without publishing it
    pub fn sync(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            ScoreDbError::Io(io::Error::new(io::ErrorKind::Other, "writer already finished"))
        })?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Flush, fsync and rename the temp file over the target.
    ///
    /// Returns the number of bytes in the published file.
    pub fn finish(mut self) -> Result<u64> {
        let writer = self.writer.take().ok_or_else(|| {
            ScoreDbError::Io(io::Error::new(io::ErrorKind::Other, "writer already finished"))
        })?;

        let file = writer.into_inner().map_err(|e| {
            ScoreDbError::Io(io::Error::new(
                e.error().kind(),
                format!("failed to flush {}: {}", self.tmp_path.display(), e.error()),
            ))
        })?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;
        Ok(self.bytes_written)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "writer already finished"))?;
        let n = writer.write(buf)?;
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        // Only reached with a live writer when finish() was never called
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// "<dir>/name.ext" → "<dir>/name.ext.tmp"
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
