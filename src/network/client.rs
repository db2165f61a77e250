//! Relay client
//!
//! Blocking client for the line protocol served by [`Server`](super::Server).

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, ScoreDbError};
use crate::protocol::{read_response, write_line, Response, Status};

/// A connected relay client
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    greeting: Response,
}

impl Client {
    /// Connect and consume the server greeting
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| ScoreDbError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);

        let greeting = read_response(&mut reader)?;
        match greeting.status {
            Status::Welcome => {}
            Status::Error => {
                return Err(ScoreDbError::Network(
                    greeting.lines.join(" ").trim().to_string(),
                ))
            }
            other => {
                return Err(ScoreDbError::Protocol(format!(
                    "Expected WELCOME, got {}",
                    other
                )))
            }
        }

        Ok(Self {
            reader,
            writer,
            greeting,
        })
    }

    /// Apply a read timeout to responses
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// The greeting the server sent on connect
    pub fn greeting(&self) -> &Response {
        &self.greeting
    }

    /// Send one raw line and read its response block
    pub fn send_line(&mut self, line: &str) -> Result<Response> {
        if line.contains('\n') {
            return Err(ScoreDbError::Usage(
                "A request must be a single line".to_string(),
            ));
        }
        write_line(&mut self.writer, line)?;
        self.read_response()
    }

    /// Read the next response block
    pub fn read_response(&mut self) -> Result<Response> {
        read_response(&mut self.reader)
    }

    /// Point query by primary key
    pub fn query_point(&mut self, id: i32) -> Result<Response> {
        self.send_line(&format!("id {}", id))
    }

    /// Range query over `score_a`
    pub fn query_range(&mut self, min_score: f32, max_score: f32) -> Result<Response> {
        self.send_line(&format!("score {} {}", min_score, max_score))
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.send_line("ping")?;
        if response.status == Status::Ok && response.lines.first().map(String::as_str) == Some("PONG") {
            Ok(())
        } else {
            Err(ScoreDbError::Protocol(format!(
                "Unexpected ping reply: {:?}",
                response
            )))
        }
    }

    /// Say goodbye and close the connection
    pub fn close(mut self) -> Result<Response> {
        self.send_line("bye")
    }
}
