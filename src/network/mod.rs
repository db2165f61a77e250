//! Network Module
//!
//! TCP relay server and client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands routed through Engine
//! - `Client` speaks the same line protocol from the other end

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
