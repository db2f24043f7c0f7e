//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use jobboard_http::Registration;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Display name for the new account
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, global: &GlobalArgs) -> Result<()> {
    let auth = session::auth_service(global)?;
    let registration = Registration::new(args.email, args.password, args.username);

    let user = auth
        .register(&registration)
        .await
        .context("Failed to register account")?;

    output::success("Account created. Check your inbox to verify the email address.");
    output::field("ID", &user.id);
    output::field("Email", &user.email);

    Ok(())
}
