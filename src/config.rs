//! Configuration for ScoreDB
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScoreDbError};

/// Main configuration for a ScoreDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── records.by_id.dat          (ascending primary key)
    ///     ├── records.by_score.dat       (descending score, id tie-break)
    ///     ├── records.by_score.idx       (serialized AVL index)
    ///     └── records.by_score.idx.meta  (index staleness metadata)
    pub data_dir: PathBuf,

    /// Check the index metadata against the score file before each range query
    pub verify_on_query: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./scoredb_data"),
            verify_on_query: true,
            listen_addr: "127.0.0.1:12345".to_string(),
            worker_threads: 8,
            max_connections: 64,
            read_timeout_ms: 300_000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    const PRIMARY_FILENAME: &'static str = "records.by_id.dat";
    const SCORE_FILENAME: &'static str = "records.by_score.dat";
    const INDEX_FILENAME: &'static str = "records.by_score.idx";
    const INDEX_META_FILENAME: &'static str = "records.by_score.idx.meta";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the primary-key-ordered record file
    pub fn primary_path(&self) -> PathBuf {
        self.data_dir.join(Self::PRIMARY_FILENAME)
    }

    /// Path of the score-ordered record file
    pub fn score_path(&self) -> PathBuf {
        self.data_dir.join(Self::SCORE_FILENAME)
    }

    /// Path of the serialized index
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(Self::INDEX_FILENAME)
    }

    /// Path of the index metadata sidecar
    pub fn index_meta_path(&self) -> PathBuf {
        self.data_dir.join(Self::INDEX_META_FILENAME)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(ScoreDbError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ScoreDbError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.listen_addr.is_empty() {
            return Err(ScoreDbError::Config("listen_addr is empty".to_string()));
        }
        Ok(())
    }

    /// Data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Enable or disable the stale-index check on range queries
    pub fn verify_on_query(mut self, enabled: bool) -> Self {
        self.config.verify_on_query = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
