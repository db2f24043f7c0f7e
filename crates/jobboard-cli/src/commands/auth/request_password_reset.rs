//! Request password reset command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestPasswordResetArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,
}

pub async fn run(args: RequestPasswordResetArgs, global: &GlobalArgs) -> Result<()> {
    let auth = session::auth_service(global)?;
    let message = auth
        .request_password_reset(&args.email)
        .await
        .context("Failed to request password reset")?;

    output::message(&message, "Password reset email sent");

    Ok(())
}
