//! scoredb Server Binary
//!
//! Starts the TCP query relay over a prepared data directory.

use std::sync::Arc;

use clap::Parser;
use scoredb::network::Server;
use scoredb::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// scoredb relay server
#[derive(Parser, Debug)]
#[command(name = "scoredb-server")]
#[command(about = "Line-oriented query relay for a scoredb data directory")]
#[command(version)]
struct Args {
    /// Data directory (as written by `scoredb-cli load` and `build-index`)
    #[arg(short, long, default_value = "./scoredb_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    listen: String,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Idle read timeout per connection in seconds (0 = none)
    #[arg(long, default_value = "300")]
    idle_timeout_secs: u64,

    /// Skip the stale-index source check on range queries
    #[arg(long)]
    no_verify: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scoredb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("scoredb server v{}", scoredb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.idle_timeout_secs.saturating_mul(1000))
        .verify_on_query(!args.no_verify)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    for path in [engine.primary_path(), engine.score_path(), engine.index_path()] {
        if !path.exists() {
            tracing::warn!(
                "{} is missing; queries depending on it will fail until it is built",
                path.display()
            );
        }
    }

    let server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
