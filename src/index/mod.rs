//! Index Module
//!
//! Order-statistics index over the score-ordered file: one entry per
//! distinct truncated `score_a`, pointing at the first record (in file
//! order) that carries that truncated score.
//!
//! ## Index File Format (big-endian)
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                        │
//! │   NodeCount: i32 (4) | TreeHeight: i32 (4)              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entries (NodeCount × 12 bytes), ascending Key           │
//! │   [Key: i32][Offset: i64]                               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The ascending entry order is relied on by the range query engine.
//! Because the data file is sorted by descending score, ascending keys
//! map to descending byte offsets.

mod avl;
mod builder;
mod meta;
mod reader;
mod verify;

use serde::{Deserialize, Serialize};

pub use avl::{AvlTree, NodeId};
pub use builder::{build_index, IndexBuildOutput, IndexBuilder};
pub use meta::{IndexMeta, SourceStamp, META_FORMAT_VERSION};
pub use reader::{IndexFile, ScanWindow};
pub use verify::{verify_index, IndexVerification};

/// Header size: NodeCount (4) + TreeHeight (4) = 8 bytes
pub const HEADER_SIZE: usize = 8;

/// Entry size: Key (4) + Offset (8) = 12 bytes
pub const ENTRY_SIZE: usize = 12;

/// One index entry: truncated score → byte offset of its first record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// `trunc(score_a)`
    pub key: i32,
    /// Byte offset in the score-ordered file
    pub offset: u64,
}
