//! Storage Module
//!
//! File persistence helpers shared by the sorter and the index builder.
//!
//! ## Responsibilities
//! - Publish build artifacts atomically (temp file + fsync + rename)
//! - Never leave a half-written sorted file or index behind on failure

mod atomic;

pub use atomic::{temp_path_for, AtomicFile, TEMP_SUFFIX};
