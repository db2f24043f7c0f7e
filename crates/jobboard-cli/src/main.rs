//! jobboard - CLI tool for the jobboard REST API.
//!
//! A thin wrapper over `jobboard-http`: sessions are persisted in a
//! credentials file and every command goes through the refreshing client.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, request};

/// Crates whose events `-v` turns up; everything else stays at `warn`.
const LOG_TARGETS: [&str; 4] = ["jobboard", "jobboard_core", "jobboard_file", "jobboard_http"];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Auth(cmd) => auth::handle(cmd, &cli.global).await,
        Commands::Request(args) => request::run(args, &cli.global).await,
    }
}

fn log_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{}={}", target, level)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the subscriber on stderr; `RUST_LOG` overrides `-v`.
fn init_logging(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbosity)));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(verbosity > 2)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
