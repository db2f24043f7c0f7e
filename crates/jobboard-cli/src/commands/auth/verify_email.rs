//! Verify email command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct VerifyEmailArgs {
    /// Token from the verification email
    pub token: String,
}

pub async fn run(args: VerifyEmailArgs, global: &GlobalArgs) -> Result<()> {
    let auth = session::auth_service(global)?;
    let message = auth
        .verify_email(&args.token)
        .await
        .context("Failed to verify email")?;

    output::message(&message, "Email verified");

    Ok(())
}
