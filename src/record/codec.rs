//! Record codec
//!
//! Encoding and decoding of a single 20-byte record.

use std::fmt;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Encoded size of one record: id (4) + four f32 scores (4 × 4)
pub const RECORD_SIZE: usize = 20;

/// One fixed-width row.
///
/// `score_a` is the sorted/indexed field; `score_b..score_d` are payload
/// carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique primary key
    pub id: i32,
    pub score_a: f32,
    pub score_b: f32,
    pub score_c: f32,
    pub score_d: f32,
}

impl Record {
    pub fn new(id: i32, score_a: f32, score_b: f32, score_c: f32, score_d: f32) -> Self {
        Self {
            id,
            score_a,
            score_b,
            score_c,
            score_d,
        }
    }

    /// Append the big-endian encoding to `buf`
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32(self.id);
        buf.put_f32(self.score_a);
        buf.put_f32(self.score_b);
        buf.put_f32(self.score_c);
        buf.put_f32(self.score_d);
    }

    /// Encode into a fixed array
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        {
            let mut buf: &mut [u8] = &mut out;
            self.encode(&mut buf);
        }
        out
    }

    /// Decode one record. Total over any 20 bytes.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut buf: &[u8] = bytes;
        Self {
            id: buf.get_i32(),
            score_a: buf.get_f32(),
            score_b: buf.get_f32(),
            score_c: buf.get_f32(),
            score_d: buf.get_f32(),
        }
    }

    /// Decode from a slice; `None` unless the slice is exactly one record long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: &[u8; RECORD_SIZE] = bytes.try_into().ok()?;
        Some(Self::decode(arr))
    }

    /// Index key of this record (see [`truncate_score`])
    pub fn score_key(&self) -> i32 {
        truncate_score(self.score_a)
    }

    /// Bit-exact equality, distinguishing -0.0 from 0.0 and comparing NaNs by payload
    pub fn bit_eq(&self, other: &Record) -> bool {
        self.id == other.id
            && self.score_a.to_bits() == other.score_a.to_bits()
            && self.score_b.to_bits() == other.score_b.to_bits()
            && self.score_c.to_bits() == other.score_c.to_bits()
            && self.score_d.to_bits() == other.score_d.to_bits()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, score_a: {:.1}, score_b: {:.1}, score_c: {:.1}, score_d: {:.1}",
            self.id, self.score_a, self.score_b, self.score_c, self.score_d
        )
    }
}

/// Integer part of a score, truncated toward zero (3.9 → 3, -3.9 → -3).
///
/// Truncation is spelled out with `f32::trunc` rather than left to the `as`
/// cast; the cast then only saturates out-of-range values to the i32 bounds
/// (NaN maps to 0). Scores in this domain are non-negative, where truncation
/// and floor agree.
pub fn truncate_score(score: f32) -> i32 {
    score.trunc() as i32
}
