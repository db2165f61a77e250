//! Index metadata sidecar
//!
//! Records which score file an index was built from, so a query against a
//! regenerated data file fails loudly instead of reading wrong offsets.

use std::fs::{self, File, Metadata};
use std::io::{self, BufReader};
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::{Producer, Result, ScoreDbError};
use crate::storage::AtomicFile;

/// Current sidecar format version
pub const META_FORMAT_VERSION: u16 = 2;

/// Cheap on-disk identity of the score file, compared on every range query.
///
/// Sorted files are published by rename, so each rewrite gets a new inode
/// and a new modification time even when its length is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    /// Length in bytes
    pub len: u64,
    /// Modification time in nanoseconds since the Unix epoch (0 if unknown)
    pub modified_nanos: u64,
    /// Inode number (0 where the platform has none)
    pub inode: u64,
}

impl SourceStamp {
    /// Stamp the file at `path`
    pub fn of(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(m) => Ok(Self::from_metadata(&m)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ScoreDbError::missing(path, Producer::Sorter))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified_nanos = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));

        Self {
            len: metadata.len(),
            modified_nanos,
            inode: inode_of(metadata),
        }
    }
}

#[cfg(unix)]
fn inode_of(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn inode_of(_metadata: &Metadata) -> u64 {
    0
}

/// Fingerprint of the source file an index was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub format_version: u16,
    /// Length of the score file in bytes
    pub source_len: u64,
    /// Modification time of the score file at build time
    pub source_modified_nanos: u64,
    /// Inode of the score file at build time
    pub source_inode: u64,
    /// CRC32 over the whole score file
    pub source_crc32: u32,
    pub record_count: u64,
    pub node_count: u32,
    pub tree_height: u32,
}

impl IndexMeta {
    /// Write the sidecar (temp file + rename)
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut file = AtomicFile::create(path)?;
        bincode::serialize_into(&mut file, self)?;
        file.finish()?;
        Ok(())
    }

    /// Load the sidecar; `Ok(None)` if it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let meta: IndexMeta = bincode::deserialize_from(BufReader::new(file))?;
        if meta.format_version != META_FORMAT_VERSION {
            return Err(ScoreDbError::Serialization(format!(
                "Unsupported index metadata version: {}",
                meta.format_version
            )));
        }
        Ok(Some(meta))
    }

    /// Identity of the score file this index was built from
    pub fn source_stamp(&self) -> SourceStamp {
        SourceStamp {
            len: self.source_len,
            modified_nanos: self.source_modified_nanos,
            inode: self.source_inode,
        }
    }

    /// Per-query staleness check: the score file must still be the one the
    /// index was built against (same length, modification time and inode)
    pub fn check_source(&self, current: &SourceStamp, score_path: &Path) -> Result<()> {
        let built = self.source_stamp();
        if current.len != built.len {
            return Err(ScoreDbError::StaleIndex(format!(
                "{} is {} bytes but the index was built from {} bytes; rebuild the index",
                score_path.display(),
                current.len,
                built.len
            )));
        }
        if current.modified_nanos != built.modified_nanos || current.inode != built.inode {
            return Err(ScoreDbError::StaleIndex(format!(
                "{} was rewritten after the index was built; rebuild the index",
                score_path.display()
            )));
        }
        Ok(())
    }
}
