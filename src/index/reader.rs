//! Index Reader
//!
//! Loads a serialized index into memory and turns integer key bounds into a
//! byte window over the score-ordered file.

use std::fs;
use std::io;
use std::path::Path;

use bytes::Buf;

use crate::error::{Producer, Result, ScoreDbError};

use super::{IndexEntry, ENTRY_SIZE, HEADER_SIZE};

/// Byte range of the score-ordered file worth scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    /// First byte to read
    pub start: u64,
    /// Stop before this offset; `None` means scan to end of file
    pub end: Option<u64>,
}

/// A loaded index: ascending entries plus the header values
#[derive(Debug, Clone)]
pub struct IndexFile {
    entries: Vec<IndexEntry>,
    tree_height: i32,
}

impl IndexFile {
    /// Load the whole index file into memory
    pub fn load(path: &Path) -> Result<Self> {
        let data = match fs::read(path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScoreDbError::missing(path, Producer::IndexBuilder));
            }
            Err(e) => return Err(e.into()),
        };
        Self::decode(&data, path)
    }

    /// Decode an index image; `path` is only used in error messages
    pub fn decode(data: &[u8], path: &Path) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ScoreDbError::corrupt(
                path,
                0,
                format!("index header needs {} bytes, file has {}", HEADER_SIZE, data.len()),
            ));
        }

        let mut buf = data;
        let node_count = buf.get_i32();
        let tree_height = buf.get_i32();

        if node_count < 0 || tree_height < 0 {
            return Err(ScoreDbError::corrupt(
                path,
                0,
                format!("negative header values (nodes={}, height={})", node_count, tree_height),
            ));
        }

        let expected = HEADER_SIZE + node_count as usize * ENTRY_SIZE;
        if data.len() != expected {
            return Err(ScoreDbError::corrupt(
                path,
                data.len().min(expected) as u64,
                format!(
                    "header promises {} entries ({} bytes), file has {} bytes",
                    node_count,
                    expected,
                    data.len()
                ),
            ));
        }

        let mut entries = Vec::with_capacity(node_count as usize);
        for i in 0..node_count as usize {
            let key = buf.get_i32();
            let raw_offset = buf.get_i64();
            let entry_pos = (HEADER_SIZE + i * ENTRY_SIZE) as u64;

            let offset = u64::try_from(raw_offset).map_err(|_| {
                ScoreDbError::corrupt(path, entry_pos, format!("negative offset {}", raw_offset))
            })?;
            if let Some(prev) = entries.last().map(|e: &IndexEntry| e.key) {
                if key <= prev {
                    return Err(ScoreDbError::corrupt(
                        path,
                        entry_pos,
                        format!("entries not strictly ascending ({} after {})", key, prev),
                    ));
                }
            }
            entries.push(IndexEntry { key, offset });
        }

        Ok(Self {
            entries,
            tree_height,
        })
    }

    /// Entries in ascending key order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Height recorded in the header
    pub fn tree_height(&self) -> i32 {
        self.tree_height
    }

    /// Offset for an exact key
    pub fn offset_of(&self, key: i32) -> Option<u64> {
        self.entries
            .binary_search_by_key(&key, |e| e.key)
            .ok()
            .map(|i| self.entries[i].offset)
    }

    /// Byte window holding every record with `min_key <= trunc(score) <= max_key`.
    ///
    /// Keys ascend while offsets descend, so the window opens at the largest
    /// key `<= max_key` and closes at the largest key `< min_key`. Returns
    /// `None` when no key falls in `[min_key, max_key]`.
    pub fn scan_window(&self, min_key: i32, max_key: i32) -> Option<ScanWindow> {
        // First entry with key >= min_key
        let lo = self.entries.partition_point(|e| e.key < min_key);
        if lo == self.entries.len() {
            return None;
        }

        // One past the last entry with key <= max_key
        let hi = self.entries.partition_point(|e| e.key <= max_key);
        if hi <= lo {
            return None;
        }

        let start = self.entries[hi - 1].offset;
        let end = lo.checked_sub(1).map(|i| self.entries[i].offset);
        Some(ScanWindow { start, end })
    }
}
