//! Command definitions
//!
//! Represents commands from relay clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    PointQuery,
    RangeQuery,
    Ping,
    Quit,
    Echo,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Look up one record by primary key
    PointQuery { id: i32 },

    /// Records with `min_score <= score_a <= max_score`
    RangeQuery { min_score: f32, max_score: f32 },

    /// Health check
    Ping,

    /// Close the session
    Quit,

    /// Unrecognized input, echoed back
    Echo(String),
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::PointQuery { .. } => CommandType::PointQuery,
            Command::RangeQuery { .. } => CommandType::RangeQuery,
            Command::Ping => CommandType::Ping,
            Command::Quit => CommandType::Quit,
            Command::Echo(_) => CommandType::Echo,
        }
    }

    /// True for commands that read data files
    pub fn touches_storage(&self) -> bool {
        matches!(
            self,
            Command::PointQuery { .. } | Command::RangeQuery { .. }
        )
    }
}
