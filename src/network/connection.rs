//! Connection Handler
//!
//! Handles individual relay client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{Result, ScoreDbError};
use crate::protocol::{read_line, write_response, Command, Response, Session, Step};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the query engine
    engine: Arc<Engine>,

    /// Prompt state for step-by-step commands
    session: Session,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            session: Session::new(),
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Sends the greeting, then answers one response block per client line
    /// until the client says `bye`, disconnects, or times out.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);
        if self.send_or_disconnect(&Response::welcome())?.is_none() {
            return Ok(());
        }

        loop {
            let line = match read_line(&mut self.reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(ScoreDbError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(ScoreDbError::Io(ref e))
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = write_response(&mut self.writer, &Response::error(e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received line from {}: {:?}", self.peer_addr, line);

            let (response, closing) = match self.session.feed(&line) {
                Step::Reply(response) => (response, false),
                Step::Execute(Command::Quit) => (Response::bye(), true),
                Step::Execute(command) => {
                    tracing::trace!(
                        command = ?command.command_type(),
                        storage = command.touches_storage(),
                        "Executing for {}",
                        self.peer_addr
                    );
                    (self.engine.execute(command), false)
                }
            };

            if self.send_or_disconnect(&response)?.is_none() || closing {
                tracing::debug!("Session with {} ended", self.peer_addr);
                return Ok(());
            }
        }
    }

    /// Send a response; `Ok(None)` if the client went away first
    fn send_or_disconnect(&mut self, response: &Response) -> Result<Option<()>> {
        match write_response(&mut self.writer, response) {
            Ok(()) => Ok(Some(())),
            Err(ScoreDbError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e)
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::NotConnected
    )
}
