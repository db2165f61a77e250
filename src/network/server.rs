//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::{self, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, ScoreDbError};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop accepting and wind down
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Connections admitted and not yet finished, keyed by connection id.
///
/// Each entry keeps a clone of the socket so shutdown can unblock the
/// worker serving it.
type Registry = Arc<Mutex<HashMap<u64, (SocketAddr, TcpStream)>>>;

/// TCP relay server
///
/// ## Threading
/// - One acceptor (the thread calling `run`/`serve`)
/// - `worker_threads` workers pulling streams from a bounded crossbeam channel
/// - At most `max_connections` admitted connections (queued or being served)
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    shutdown: ShutdownHandle,
    connections: Registry,
    next_connection_id: AtomicU64,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            shutdown: ShutdownHandle::default(),
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Connections currently admitted
    pub fn active_connections(&self) -> usize {
        self.connections.lock().len()
    }

    /// Bind `listen_addr` and serve until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        self.config.validate()?;
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            ScoreDbError::Network(format!("Failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        self.serve(listener)
    }

    /// Serve on an already-bound listener until shutdown (blocking)
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        self.config.validate()?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        tracing::info!(
            workers = self.config.worker_threads,
            max_connections = self.config.max_connections,
            "Listening on {}",
            local_addr
        );

        let (tx, rx) = channel::bounded::<(u64, TcpStream)>(self.config.max_connections);
        let workers: Vec<JoinHandle<()>> = (0..self.config.worker_threads)
            .map(|i| self.spawn_worker(i, rx.clone()))
            .collect::<io::Result<_>>()?;
        drop(rx);

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => match self.admit(&stream, addr) {
                    Ok(Some(id)) => {
                        if tx.send((id, stream)).is_err() {
                            self.connections.lock().remove(&id);
                            break;
                        }
                    }
                    Ok(None) => reject(stream, addr),
                    Err(e) => tracing::warn!("Dropping connection from {}: {}", addr, e),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!(
            active = self.active_connections(),
            "Shutting down; closing open connections"
        );
        drop(tx);
        self.close_admitted();
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Register a connection if under the limit; `Ok(None)` when full
    fn admit(&self, stream: &TcpStream, addr: SocketAddr) -> io::Result<Option<u64>> {
        let mut connections = self.connections.lock();
        if connections.len() >= self.config.max_connections {
            return Ok(None);
        }
        stream.set_nonblocking(false)?;
        let handle = stream.try_clone()?;
        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        connections.insert(id, (addr, handle));
        Ok(Some(id))
    }

    /// Shut down every admitted socket so blocked workers see end of stream
    fn close_admitted(&self) {
        for (addr, stream) in self.connections.lock().values() {
            tracing::debug!("Closing connection to {}", addr);
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                if e.kind() != io::ErrorKind::NotConnected {
                    tracing::warn!("Failed to close connection to {}: {}", addr, e);
                }
            }
        }
    }

    fn spawn_worker(&self, index: usize, rx: Receiver<(u64, TcpStream)>) -> io::Result<JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let connections = Arc::clone(&self.connections);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("scoredb-worker-{}", index))
            .spawn(move || {
                for (id, stream) in rx.iter() {
                    serve_connection(stream, Arc::clone(&engine), read_ms, write_ms);
                    connections.lock().remove(&id);
                }
            })
    }
}

fn serve_connection(stream: TcpStream, engine: Arc<Engine>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, engine) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };
    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
    }
    if let Err(e) = connection.handle() {
        tracing::warn!("Connection {} ended with error: {}", connection.peer_addr(), e);
    }
}

/// Tell an over-limit client why it is being dropped
fn reject(stream: TcpStream, addr: SocketAddr) {
    tracing::warn!("Rejecting {}: connection limit reached", addr);
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_write_timeout(Some(Duration::from_millis(500)));
    let mut writer = BufWriter::new(stream);
    let _ = write_response(&mut writer, &Response::error("server busy: connection limit reached"));
}
