//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::request::RequestArgs;

/// Command-line client for the jobboard REST API.
#[derive(Parser, Debug)]
#[command(name = "jobboard")]
#[command(author, version = env!("JOBBOARD_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(long, env = "JOBBOARD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Credentials file (defaults to the user data directory)
    #[arg(long, env = "JOBBOARD_CREDENTIALS", global = true)]
    pub store: Option<PathBuf>,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session and account operations
    Auth(AuthCommand),

    /// Send an authenticated request to any API path
    Request(RequestArgs),
}
