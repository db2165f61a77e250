//! Query Module
//!
//! The two read paths over the sorted files.
//!
//! ## Responsibilities
//! - Point lookup by primary key over the id-ordered file
//! - Score range lookup over the score-ordered file, bounded by the index
//!
//! Both are early-exit sequential scans: they stop as soon as the sort
//! order of the file proves no further record can match.

mod point;
mod range;

pub use point::{query_point, PointQueryResult};
pub use range::{key_bounds, query_range, validate_range, RangeQueryResult};
