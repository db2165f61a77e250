//! Engine Module
//!
//! Coordinates the build pipeline and the query paths over one data
//! directory.
//!
//! ## Responsibilities
//! - Load: CSV → records → both sorted files
//! - Build the index over the score-ordered file
//! - Answer point and range queries
//! - Route relay commands to the right query
//!
//! The engine holds no mutable state: every query opens its own file
//! handles, so one `Engine` can be shared across connection threads.
//! Loading and index building assume no concurrent readers.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, ScoreDbError};
use crate::index::{self, IndexBuildOutput, IndexVerification};
use crate::ingest::{self, SkippedRow};
use crate::protocol::{Command, Response};
use crate::query::{self, PointQueryResult, RangeQueryResult};
use crate::record::Record;
use crate::sort::{self, SortOutput};

/// Summary of a CSV load
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Records written to each sorted file
    pub record_count: u64,
    /// Rows dropped during parsing
    pub skipped: Vec<SkippedRow>,
    /// Time spent sorting and writing
    pub elapsed: Duration,
}

/// The query engine over one data directory
pub struct Engine {
    /// Engine configuration
    config: Config,
}

impl Engine {
    /// Open an engine, creating the data directory if needed
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        tracing::debug!("Engine opened at {}", config.data_dir.display());
        Ok(Self { config })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    // =========================================================================
    // Build Pipeline
    // =========================================================================

    /// Parse `csv_path` and write both sorted files
    pub fn load_csv(&self, csv_path: &Path) -> Result<LoadReport> {
        let report = ingest::load_csv(csv_path)?;
        let output = self.load_records(report.records)?;
        Ok(LoadReport {
            record_count: output.record_count,
            skipped: report.skipped,
            elapsed: output.elapsed,
        })
    }

    /// Sort `records` both ways and write the two data files
    ///
    /// Primary keys must be unique.
    pub fn load_records(&self, records: Vec<Record>) -> Result<SortOutput> {
        let output = sort::write_sorted_files(
            records,
            &self.config.primary_path(),
            &self.config.score_path(),
        )?;
        Ok(output)
    }

    /// Build the index over the score-ordered file
    pub fn build_index(&self) -> Result<IndexBuildOutput> {
        let meta_path = self.config.index_meta_path();
        index::build_index(
            &self.config.score_path(),
            &self.config.index_path(),
            Some(&meta_path),
        )
    }

    /// Cross-check the index against the score-ordered file
    pub fn verify_index(&self) -> Result<IndexVerification> {
        let meta_path = self.config.index_meta_path();
        index::verify_index(
            &self.config.index_path(),
            &self.config.score_path(),
            Some(&meta_path),
        )
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up one record by primary key
    pub fn query_point(&self, id: i32) -> Result<PointQueryResult> {
        query::query_point(&self.config.primary_path(), id)
    }

    /// Records with `min_score <= score_a <= max_score`, descending score
    pub fn query_range(&self, min_score: f32, max_score: f32) -> Result<RangeQueryResult> {
        let meta_path = self
            .config
            .verify_on_query
            .then(|| self.config.index_meta_path());
        query::query_range(
            &self.config.index_path(),
            &self.config.score_path(),
            meta_path.as_deref(),
            min_score,
            max_score,
        )
    }

    /// Execute a relay command
    ///
    /// Failures become ERROR responses; the connection stays usable.
    pub fn execute(&self, command: Command) -> Response {
        match command {
            Command::PointQuery { id } => match self.query_point(id) {
                Ok(result) => Response::from_point(&result),
                Err(e) => self.error_response(e),
            },
            Command::RangeQuery {
                min_score,
                max_score,
            } => match self.query_range(min_score, max_score) {
                Ok(result) => Response::from_range(&result),
                Err(e) => self.error_response(e),
            },
            Command::Ping => Response::ok(vec!["PONG".to_string()]),
            Command::Quit => Response::bye(),
            Command::Echo(line) => Response::ok(vec![format!("Server received: {}", line)]),
        }
    }

    fn error_response(&self, error: ScoreDbError) -> Response {
        if error.is_usage() {
            tracing::debug!("Rejected query: {}", error);
        } else {
            tracing::warn!("Query failed: {}", error);
        }
        Response::error(error.to_string())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of the id-ordered file
    pub fn primary_path(&self) -> PathBuf {
        self.config.primary_path()
    }

    /// Path of the score-ordered file
    pub fn score_path(&self) -> PathBuf {
        self.config.score_path()
    }

    /// Path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.config.index_path()
    }

    /// Path of the index metadata sidecar
    pub fn index_meta_path(&self) -> PathBuf {
        self.config.index_meta_path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
