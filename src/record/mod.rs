//! Record Module
//!
//! Fixed-size binary records and sequential access to record files.
//!
//! ## Record Format (20 bytes, big-endian, no padding)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ id (i32) │ score_a  │ score_b  │ score_c  │ score_d  │
//! │    4     │ f32 (4)  │ f32 (4)  │ f32 (4)  │ f32 (4)  │
//! └──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! Files are raw concatenations of records with no header; record
//! boundaries are multiples of [`RECORD_SIZE`] from the start of the file.

mod codec;
mod reader;
mod writer;

pub use codec::{truncate_score, Record, RECORD_SIZE};
pub use reader::RecordReader;
pub use writer::{write_records, RecordFileWriter};
