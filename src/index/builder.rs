//! Index Builder
//!
//! Scans the score-ordered file once and serializes the resulting AVL tree.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use bytes::BufMut;

use crate::error::{Producer, Result, ScoreDbError};
use crate::record::{Record, RecordReader};
use crate::storage::AtomicFile;

use super::{AvlTree, IndexMeta, SourceStamp, ENTRY_SIZE, HEADER_SIZE, META_FORMAT_VERSION};

/// Summary of a completed index build
#[derive(Debug, Clone)]
pub struct IndexBuildOutput {
    /// Records scanned in the source file
    pub record_count: u64,
    /// Distinct truncated keys (= entries written)
    pub node_count: usize,
    /// Height of the AVL tree
    pub tree_height: i32,
    /// Size of the index file in bytes
    pub index_size: u64,
    /// Wall time for scan + serialization
    pub elapsed: Duration,
}

/// Accumulates first-occurrence offsets while the source is scanned
pub struct IndexBuilder {
    /// Truncated score → first offset
    tree: AvlTree,
    /// Records seen so far
    record_count: u64,
    /// Bytes seen so far
    source_len: u64,
    /// Running CRC over the source records
    source_hasher: crc32fast::Hasher,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            tree: AvlTree::new(),
            record_count: 0,
            source_len: 0,
            source_hasher: crc32fast::Hasher::new(),
        }
    }

    /// Feed the record found at `offset` (must be called in file order).
    ///
    /// Returns true if this record opened a new truncated-score bucket.
    pub fn add(&mut self, offset: u64, record: &Record) -> bool {
        let bytes = record.to_bytes();
        self.source_hasher.update(&bytes);
        self.source_len += bytes.len() as u64;
        self.record_count += 1;

        // Skip-if-exists keeps the first (highest-score) offset per key
        self.tree.insert(record.score_key(), offset)
    }

    /// The tree built so far
    pub fn tree(&self) -> &AvlTree {
        &self.tree
    }

    /// Records fed so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Metadata describing the source consumed so far; `source` identifies
    /// the file on disk
    pub fn meta(&self, source: &SourceStamp) -> Result<IndexMeta> {
        let node_count = u32::try_from(self.tree.len())
            .map_err(|_| ScoreDbError::Serialization("index node count overflows u32".into()))?;
        Ok(IndexMeta {
            format_version: META_FORMAT_VERSION,
            source_len: self.source_len,
            source_modified_nanos: source.modified_nanos,
            source_inode: source.inode,
            source_crc32: self.source_hasher.clone().finalize(),
            record_count: self.record_count,
            node_count,
            tree_height: self.tree.height() as u32,
        })
    }

    /// Encode header + in-order entries
    pub fn encode(&self) -> Result<Vec<u8>> {
        let entries = self.tree.in_order();
        let node_count = i32::try_from(entries.len())
            .map_err(|_| ScoreDbError::Serialization("index node count overflows i32".into()))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + entries.len() * ENTRY_SIZE);
        buf.put_i32(node_count);
        buf.put_i32(self.tree.height());
        for entry in &entries {
            let offset = i64::try_from(entry.offset).map_err(|_| {
                ScoreDbError::Serialization(format!("offset {} overflows i64", entry.offset))
            })?;
            buf.put_i32(entry.key);
            buf.put_i64(offset);
        }
        Ok(buf)
    }

    /// Serialize to `path` (temp file + rename). Returns bytes written.
    pub fn write(&self, path: &Path) -> Result<u64> {
        let bytes = self.encode()?;
        let mut file = AtomicFile::create(path)?;
        file.write_all(&bytes)?;
        file.finish()
    }
}

/// Build the index for `score_path`.
///
/// The source is scanned completely before anything is written, so a missing
/// or truncated source leaves any previous index untouched. When `meta_path`
/// is given the staleness sidecar is rewritten alongside the index.
pub fn build_index(
    score_path: &Path,
    index_path: &Path,
    meta_path: Option<&Path>,
) -> Result<IndexBuildOutput> {
    let start = Instant::now();

    let mut builder = IndexBuilder::new();
    let reader = RecordReader::open(score_path, Producer::Sorter)?;
    let stamp = SourceStamp::of(score_path)?;
    for item in reader {
        let (offset, record) = item?;
        builder.add(offset, &record);
    }

    // The old sidecar describes the old index; drop it before replacing
    if let Some(meta_path) = meta_path {
        match fs::remove_file(meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    let index_size = builder.write(index_path)?;
    if let Some(meta_path) = meta_path {
        builder.meta(&stamp)?.write(meta_path)?;
    }

    let output = IndexBuildOutput {
        record_count: builder.record_count(),
        node_count: builder.tree().len(),
        tree_height: builder.tree().height(),
        index_size,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        records = output.record_count,
        nodes = output.node_count,
        height = output.tree_height,
        bytes = output.index_size,
        elapsed_ms = output.elapsed.as_millis() as u64,
        "Built index {}",
        index_path.display()
    );

    Ok(output)
}
