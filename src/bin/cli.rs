//! scoredb CLI
//!
//! Builds the data files and runs queries, either in-process against a data
//! directory or remotely through a running relay.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scoredb::network::Client;
use scoredb::protocol::{listing_lines, Response, Status};
use scoredb::{Config, Engine, Result, ScoreDbError};
use tracing_subscriber::{fmt, EnvFilter};

/// scoredb CLI
#[derive(Parser, Debug)]
#[command(name = "scoredb-cli")]
#[command(about = "Build and query a scoredb data directory")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./scoredb_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a CSV file and write both sorted record files
    Load {
        /// CSV source (header line, then id,score_a,score_b,score_c,score_d)
        csv: PathBuf,
    },

    /// Build the index over the score-ordered file
    BuildIndex,

    /// Look up a record by primary key
    ById {
        /// The id to look up
        #[arg(allow_negative_numbers = true)]
        id: i32,
    },

    /// List records with min <= score_a <= max
    ByScore {
        /// Lower bound (inclusive)
        #[arg(allow_negative_numbers = true)]
        min: f32,

        /// Upper bound (inclusive)
        #[arg(allow_negative_numbers = true)]
        max: f32,

        /// Print every matching record instead of the summary only
        #[arg(short, long)]
        list: bool,
    },

    /// Cross-check the index against the score-ordered file
    VerifyIndex,

    /// Send a query to a running relay
    Remote {
        /// Server address
        #[arg(short, long, default_value = "127.0.0.1:12345")]
        server: String,

        #[command(subcommand)]
        command: RemoteCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RemoteCommand {
    /// Point query by primary key
    Id {
        #[arg(allow_negative_numbers = true)]
        id: i32,
    },

    /// Score range query
    Score {
        #[arg(allow_negative_numbers = true)]
        min: f32,

        #[arg(allow_negative_numbers = true)]
        max: f32,
    },

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_usage() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let Args { data_dir, command } = args;
    let open = || Engine::open(Config::builder().data_dir(&data_dir).build());

    match command {
        Commands::Remote { server, command } => return run_remote(&server, command),
        Commands::Load { csv } => {
            let engine = open()?;
            let report = engine.load_csv(&csv)?;
            for row in &report.skipped {
                eprintln!("skipped line {}: {}", row.line, row.reason);
            }
            println!(
                "Sorted {} records in {} ms",
                report.record_count,
                report.elapsed.as_millis()
            );
            println!("  {}", engine.primary_path().display());
            println!("  {}", engine.score_path().display());
        }
        Commands::BuildIndex => {
            let engine = open()?;
            let output = engine.build_index()?;
            println!(
                "Indexed {} records into {} keys (tree height {}) in {} ms",
                output.record_count,
                output.node_count,
                output.tree_height,
                output.elapsed.as_millis()
            );
            println!("  {} ({} bytes)", engine.index_path().display(), output.index_size);
        }
        Commands::ById { id } => {
            let result = open()?.query_point(id)?;
            println!("{}", result);
            if !result.found() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::ByScore { min, max, list } => {
            let result = open()?.query_range(min, max)?;
            println!("{}", result);
            if list {
                for (i, record) in result.records.iter().enumerate() {
                    println!("{}. {}", i + 1, record);
                }
            } else {
                // Head/tail listing, same as the relay
                for line in listing_lines(&result) {
                    println!("{}", line);
                }
            }
        }
        Commands::VerifyIndex => {
            let report = open()?.verify_index()?;
            println!(
                "Checked {} index entries against {} records (crc32 {:08x})",
                report.entries_checked, report.records_scanned, report.source_crc32
            );
            match report.meta_matches {
                Some(true) => println!("Metadata matches the score file"),
                Some(false) => println!("Metadata does not match the score file"),
                None => println!("No index metadata found"),
            }
            for problem in &report.problems {
                println!("  problem: {}", problem);
            }
            if !report.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_remote(server: &str, command: RemoteCommand) -> Result<ExitCode> {
    let mut client = Client::connect(server)?;

    let response = match command {
        RemoteCommand::Id { id } => client.query_point(id)?,
        RemoteCommand::Score { min, max } => client.query_range(min, max)?,
        RemoteCommand::Ping => {
            client.ping()?;
            println!("PONG");
            let _ = client.close();
            return Ok(ExitCode::SUCCESS);
        }
    };
    let _ = client.close();

    print_response(&response);
    match response.status {
        Status::Ok => Ok(ExitCode::SUCCESS),
        Status::NotFound => Ok(ExitCode::FAILURE),
        Status::Error => Err(ScoreDbError::Network(format!(
            "server error: {}",
            response.lines.join("; ")
        ))),
        other => Err(ScoreDbError::Protocol(format!("unexpected status {}", other))),
    }
}

fn print_response(response: &Response) {
    for line in &response.lines {
        println!("{}", line);
    }
}
