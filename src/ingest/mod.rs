//! Ingest Module
//!
//! CSV source parsing.
//!
//! ## Input Format
//! ```text
//! id,score_a,score_b,score_c,score_d[,ignored...]   <- header, discarded
//! 1,90.0,80,70,85
//! 2,90.0,60,70,75
//! ```
//!
//! Rows with fewer than five fields, unparsable numbers or non-finite
//! scores are skipped with a warning; they never stop the load.

mod csv;

pub use csv::{load_csv, parse_csv, parse_row, IngestReport, SkippedRow};
