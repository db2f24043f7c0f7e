//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, global: &GlobalArgs) -> Result<()> {
    let store = session::open_store(global)?;
    let updated_at = store.updated_at().await?;
    let auth = session::auth_service(global)?;
    session::require_session(auth.client()).await?;

    let user = auth.me().await.context("Failed to fetch current user")?;

    output::field("ID", &user.id);
    if let Some(email) = &user.email {
        output::field("Email", email);
    }
    output::field("API", auth.client().base_url().as_str());
    if let Some(updated_at) = updated_at {
        output::field("Session updated", &updated_at.to_rfc3339());
    }

    Ok(())
}
