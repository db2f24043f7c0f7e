//! Client construction from the global flags.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use jobboard_core::{ApiUrl, CredentialStore};
use jobboard_file::{CREDENTIALS_FILE, FileCredentialStore};
use jobboard_http::{AuthService, AuthenticatedClient, ClientConfig};

use crate::cli::GlobalArgs;

/// `ProjectDirs` identity: reverse-DNS qualifier, organization, application.
const PROJECT: (&str, &str, &str) = ("io", "jobboard", "jobboard");

/// Resolve the credentials file path.
pub fn store_path(global: &GlobalArgs) -> Result<PathBuf> {
    if let Some(path) = &global.store {
        return Ok(path.clone());
    }

    let (qualifier, organization, application) = PROJECT;
    let dirs = ProjectDirs::from(qualifier, organization, application)
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().join(CREDENTIALS_FILE))
}

pub fn open_store(global: &GlobalArgs) -> Result<FileCredentialStore> {
    let path = store_path(global)?;
    debug!(path = %path.display(), "Using credentials file");
    FileCredentialStore::open(&path)
        .with_context(|| format!("Failed to open credentials file {}", path.display()))
}

pub fn config(global: &GlobalArgs) -> Result<ClientConfig> {
    let base_url = match &global.api_url {
        Some(url) => ApiUrl::new(url).context("Invalid API URL")?,
        None => ApiUrl::default(),
    };

    let mut config = ClientConfig::new(base_url)
        .with_user_agent(concat!("jobboard-cli/", env!("JOBBOARD_VERSION")));

    if let Some(secs) = global.timeout {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }

    Ok(config)
}

pub fn client(global: &GlobalArgs) -> Result<AuthenticatedClient> {
    let store = open_store(global)?;
    AuthenticatedClient::with_store(config(global)?, store).context("Failed to create client")
}

pub fn auth_service(global: &GlobalArgs) -> Result<AuthService> {
    Ok(AuthService::new(client(global)?))
}

/// Fail early with a helpful message when no session is stored.
pub async fn require_session(client: &AuthenticatedClient) -> Result<()> {
    let store = client.store();
    let has_access = store.access_token().await?.is_some();
    let has_refresh = store.refresh_token().await?.is_some();

    anyhow::ensure!(
        has_access || has_refresh,
        "No active session. Run 'jobboard auth login' first."
    );
    Ok(())
}
