//! Error types for ScoreDB
//!
//! Provides a unified error type for all operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ScoreDbError
pub type Result<T> = std::result::Result<T, ScoreDbError>;

/// The step that produces a given file, named in `MissingFile` errors so the
/// operator knows what to run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Producer {
    /// `scoredb-cli load` (CSV ingest + dual-order sort)
    Sorter,
    /// `scoredb-cli build-index`
    IndexBuilder,
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Sorter => write!(f, "scoredb-cli load"),
            Producer::IndexBuilder => write!(f, "scoredb-cli build-index"),
        }
    }
}

/// Unified error type for ScoreDB operations
#[derive(Debug, Error)]
pub enum ScoreDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Missing file: {} (run `{producer}` first)", path.display())]
    MissingFile { path: PathBuf, producer: Producer },

    #[error("Corrupt data in {} at byte offset {offset}: {reason}", path.display())]
    CorruptData {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("Stale index: {0}")]
    StaleIndex(String),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Malformed input row {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Usage error: {0}")]
    Usage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScoreDbError {
    /// Build a `MissingFile` error for `path`
    pub fn missing(path: impl Into<PathBuf>, producer: Producer) -> Self {
        ScoreDbError::MissingFile {
            path: path.into(),
            producer,
        }
    }

    /// Build a `CorruptData` error for `path` at `offset`
    pub fn corrupt(path: impl Into<PathBuf>, offset: u64, reason: impl Into<String>) -> Self {
        ScoreDbError::CorruptData {
            path: path.into(),
            offset,
            reason: reason.into(),
        }
    }

    /// True for errors that reject the caller's input before any file I/O
    pub fn is_usage(&self) -> bool {
        matches!(self, ScoreDbError::Usage(_))
    }
}

impl From<bincode::Error> for ScoreDbError {
    fn from(e: bincode::Error) -> Self {
        ScoreDbError::Serialization(e.to_string())
    }
}
