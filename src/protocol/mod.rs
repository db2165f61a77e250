//! Protocol Module
//!
//! Defines the line-oriented relay protocol.
//!
//! ## Requests
//! - `id [<id>]`: point query by primary key
//! - `score [<min> <max>]`: score range query
//! - `ping`: health check
//! - `bye` / `quit`: close the session
//! - anything else is echoed back
//!
//! ## Responses
//! ```text
//! ┌────────────┬────────────────────┬─────┐
//! │ STATUS \n  │ body lines \n ...  │ . \n│
//! └────────────┴────────────────────┴─────┘
//! ```
//!
//! ### Status Codes
//! - OK, NOT_FOUND, ERROR
//! - PROMPT (argument expected), WELCOME (on connect), BYE (closing)

mod codec;
mod command;
mod response;
mod session;

pub use codec::{
    encode_response, read_line, read_response, write_line, write_response, MAX_LINE_LEN,
    TERMINATOR,
};
pub use command::{Command, CommandType};
pub use response::{listing_lines, Response, Status, LISTED_EDGE};
pub use session::{Session, SessionState, Step};
