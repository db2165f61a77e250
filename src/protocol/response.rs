//! Response definitions
//!
//! Represents responses to relay clients.

use std::fmt;

use crate::query::{PointQueryResult, RangeQueryResult};

/// Matches listed at each end of a long range result
pub const LISTED_EDGE: usize = 10;

/// Numbered listing of a range result.
///
/// The first [`LISTED_EDGE`] matches are always listed. When there are more
/// than twice that many, a `...` line follows and then the last
/// [`LISTED_EDGE`] matches; for 11 to 20 matches only the first ten appear.
pub fn listing_lines(result: &RangeQueryResult) -> Vec<String> {
    let count = result.count();
    let numbered = |i: usize| format!("{}. {}", i + 1, result.records[i]);

    let mut lines: Vec<String> = (0..count.min(LISTED_EDGE)).map(numbered).collect();
    if count > 2 * LISTED_EDGE {
        lines.push("...".to_string());
        lines.extend((count - LISTED_EDGE..count).map(numbered));
    }
    lines
}

/// Response status, sent as the first line of every response block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
    /// The server is waiting for the next argument line
    Prompt,
    /// Greeting sent on connect
    Welcome,
    /// Session closed
    Bye,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotFound => "NOT_FOUND",
            Status::Error => "ERROR",
            Status::Prompt => "PROMPT",
            Status::Welcome => "WELCOME",
            Status::Bye => "BYE",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "OK" => Some(Status::Ok),
            "NOT_FOUND" => Some(Status::NotFound),
            "ERROR" => Some(Status::Error),
            "PROMPT" => Some(Status::Prompt),
            "WELCOME" => Some(Status::Welcome),
            "BYE" => Some(Status::Bye),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response to send to a client: status plus text body lines
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub lines: Vec<String>,
}

impl Response {
    pub fn new(status: Status, lines: Vec<String>) -> Self {
        Self { status, lines }
    }

    /// Create an OK response with body lines
    pub fn ok(lines: Vec<String>) -> Self {
        Self::new(Status::Ok, lines)
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, vec![message.into()])
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Status::Error, vec![message.into()])
    }

    /// Ask the client for the next argument
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::new(Status::Prompt, vec![message.into()])
    }

    pub fn welcome() -> Self {
        Self::new(
            Status::Welcome,
            vec!["Connected to scoredb. Commands: id, score, ping, bye".to_string()],
        )
    }

    pub fn bye() -> Self {
        Self::new(Status::Bye, vec!["Bye!".to_string()])
    }

    /// Body of a point query
    pub fn from_point(result: &PointQueryResult) -> Self {
        let elapsed = format!("elapsed: {} ms", result.elapsed.as_millis());
        match &result.record {
            Some(record) => Self::ok(vec![record.to_string(), elapsed]),
            None => Self::new(
                Status::NotFound,
                vec![format!("no record with id {}", result.id), elapsed],
            ),
        }
    }

    /// Body of a range query: summary, then [`listing_lines`]
    pub fn from_range(result: &RangeQueryResult) -> Self {
        let mut lines = vec![
            format!("range: [{}, {}]", result.min_score, result.max_score),
            format!("count: {}", result.count()),
            format!("average: {:.2}", result.average()),
            format!("elapsed: {} ms", result.elapsed.as_millis()),
        ];
        lines.extend(listing_lines(result));

        Self::ok(lines)
    }

    /// Value of a `name: value` body line, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            line.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(": "))
        })
    }
}
