//! Logout-all command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutAllArgs {}

pub async fn run(_args: LogoutAllArgs, global: &GlobalArgs) -> Result<()> {
    let auth = session::auth_service(global)?;
    session::require_session(auth.client()).await?;

    let result = auth.logout_all().await;
    if result.is_err() {
        output::warning("Local credentials were removed anyway");
    }
    let message = result.context("Failed to revoke sessions")?;

    output::message(&message, "Logged out of all sessions");

    Ok(())
}
