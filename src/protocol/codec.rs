//! Protocol codec
//!
//! Line framing for the relay protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! One UTF-8 line per client message, `\n` or `\r\n` terminated.
//!
//! ### Response
//! ```text
//! STATUS            <- OK | NOT_FOUND | ERROR | PROMPT | WELCOME | BYE
//! body line 1
//! ...
//! .                 <- terminator
//! ```
//! Body lines starting with `.` are sent with an extra leading `.` so the
//! terminator stays unambiguous.

use std::io::{BufRead, Read, Write};

use crate::error::{Result, ScoreDbError};

use super::{Response, Status};

/// Line that closes every response block
pub const TERMINATOR: &str = ".";

/// Longest accepted line, in bytes (excluding the newline)
pub const MAX_LINE_LEN: usize = 4096;

// =============================================================================
// Line I/O
// =============================================================================

/// Read one line without its terminator; `Ok(None)` at end of stream
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let limit = (MAX_LINE_LEN + 2) as u64;
    let n = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if n as u64 == limit {
        return Err(ScoreDbError::Protocol(format!(
            "Line too long (max {} bytes)",
            MAX_LINE_LEN
        )));
    }
    if buf.len() > MAX_LINE_LEN {
        return Err(ScoreDbError::Protocol(format!(
            "Line too long (max {} bytes)",
            MAX_LINE_LEN
        )));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| ScoreDbError::Protocol(format!("Line is not valid UTF-8: {}", e)))
}

/// Write one line and flush
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response block
pub fn encode_response(response: &Response) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(response.status.as_str().as_bytes());
    out.push(b'\n');
    for line in &response.lines {
        if line.starts_with('.') {
            out.push(b'.');
        }
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    out.extend_from_slice(TERMINATOR.as_bytes());
    out.push(b'\n');
    out
}

/// Write a response block to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response block from a stream
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let status_line = read_line(reader)?.ok_or_else(|| {
        ScoreDbError::Protocol("Connection closed before response".to_string())
    })?;
    let status = Status::parse(status_line.trim()).ok_or_else(|| {
        ScoreDbError::Protocol(format!("Unknown response status: {:?}", status_line))
    })?;

    let mut lines = Vec::new();
    loop {
        let line = read_line(reader)?.ok_or_else(|| {
            ScoreDbError::Protocol("Connection closed inside response".to_string())
        })?;
        if line == TERMINATOR {
            break;
        }
        match line.strip_prefix('.') {
            Some(rest) => lines.push(rest.to_string()),
            None => lines.push(line),
        }
    }

    Ok(Response { status, lines })
}
