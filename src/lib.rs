//! # scoredb
//!
//! A miniature read-optimized storage engine for fixed-size score records:
//! - Two sorted copies of the data (by primary key, by descending score)
//! - An AVL-derived index over the truncated score, persisted as a flat table
//! - Range queries bounded by the index, point queries with early exit
//! - A line-oriented TCP relay in front of the query engine
//!
//! ## Architecture Overview
//!
//! ```text
//!   CSV ──► ingest ──► sort ──┬──► records.by_id.dat ─────────────┐
//!                             │                                   │
//!                             └──► records.by_score.dat ──┐       │
//!                                                         │       │
//!                                  index (AVL) ◄──────────┘       │
//!                                      │                          │
//!                                      ▼                          │
//!                              records.by_score.idx               │
//!                                      │                          │
//! ┌────────────────────────────────────▼──────────────────────────▼─────┐
//! │                               Engine                                │
//! │                range query           point query                    │
//! └────────────────────────────────────▲────────────────────────────────┘
//!                                      │
//! ┌────────────────────────────────────┴────────────────────────────────┐
//! │                        TCP Relay Server                             │
//! │                  (acceptor + worker thread pool)                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod sort;
pub mod ingest;
pub mod index;
pub mod query;
pub mod protocol;
pub mod network;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ScoreDbError};
pub use config::Config;
pub use engine::Engine;
pub use record::Record;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of scoredb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
