//! Reset password command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Token from the password reset email
    #[arg(long)]
    pub token: String,

    /// New password
    #[arg(long, env = "JOBBOARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: ResetPasswordArgs, global: &GlobalArgs) -> Result<()> {
    let auth = session::auth_service(global)?;
    let message = auth
        .reset_password(&args.token, &args.password)
        .await
        .context("Failed to reset password")?;

    output::message(&message, "Password updated");

    Ok(())
}
