//! Filesystem persistence for session tokens.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use jobboard_core::error::{Error, StorageError};
use jobboard_core::{AccessToken, CredentialStore, RefreshToken, Result, TokenPair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Default file name for persisted credentials.
pub const CREDENTIALS_FILE: &str = "credentials.json";

fn corrupt(err: serde_json::Error) -> Error {
    Error::Storage(StorageError::Corrupt {
        message: err.to_string(),
    })
}

/// On-disk token state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Credential store persisted as a JSON file.
///
/// Every read goes to disk, so several processes sharing the file observe
/// each other's logins, refreshes and logouts. Writes take an exclusive lock
/// on a sibling lock file, replace the credentials file atomically, and
/// remove it entirely once both tokens are cleared.
#[derive(Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Arc<Mutex<()>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// Existing state is validated but not required.
    #[instrument(skip_all)]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let store = Self {
            path,
            guard: Arc::new(Mutex::new(())),
        };

        let state = store.read_state()?;
        debug!(
            path = %store.path.display(),
            has_access_token = state.access_token.is_some(),
            has_refresh_token = state.refresh_token.is_some(),
            "Opened credential store"
        );

        Ok(store)
    }

    /// Open `credentials.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(dir.as_ref().join(CREDENTIALS_FILE))
    }

    /// Path of the credentials file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the stored tokens were last written.
    pub async fn updated_at(&self) -> Result<Option<DateTime<Utc>>> {
        let _guard = self.guard.lock().await;
        Ok(self.read_locked()?.updated_at)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn open_lock(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?)
    }

    fn read_state(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }
        let json = fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(corrupt)
    }

    /// Read under a shared cross-process lock.
    fn read_locked(&self) -> Result<StoredCredentials> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let state = self.read_state();
        lock.unlock()?;
        state
    }

    fn write_state(&self, state: &StoredCredentials) -> Result<()> {
        if state.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(state).map_err(corrupt)?;
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", CREDENTIALS_FILE, Uuid::new_v4().simple()));

        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp)?;

        // Set restrictive permissions before any token touches the disk
        #[cfg(unix)]
        {
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        let written = file.write_all(json.as_bytes()).and_then(|_| file.sync_all());
        drop(file);
        let written = written.and_then(|_| fs::rename(&tmp, &self.path));

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        Ok(())
    }

    /// Apply `change` to the stored state under both locks.
    async fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoredCredentials) + Send,
    {
        let _guard = self.guard.lock().await;

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_state().and_then(|mut state| {
            change(&mut state);
            state.updated_at = Some(Utc::now());
            self.write_state(&state)
        });

        lock.unlock()?;
        result
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        let _guard = self.guard.lock().await;
        Ok(self.read_locked()?.access_token.map(AccessToken::new))
    }

    #[instrument(skip(self, token))]
    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        debug!("Persisting access token");
        self.update(|state| state.access_token = Some(token.as_str().to_string()))
            .await
    }

    #[instrument(skip(self))]
    async fn clear_access_token(&self) -> Result<()> {
        debug!("Clearing access token");
        self.update(|state| state.access_token = None).await
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        let _guard = self.guard.lock().await;
        Ok(self.read_locked()?.refresh_token.map(RefreshToken::new))
    }

    #[instrument(skip(self, token))]
    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        debug!("Persisting refresh token");
        self.update(|state| state.refresh_token = Some(token.as_str().to_string()))
            .await
    }

    #[instrument(skip(self))]
    async fn clear_refresh_token(&self) -> Result<()> {
        debug!("Clearing refresh token");
        self.update(|state| state.refresh_token = None).await
    }

    #[instrument(skip(self, tokens))]
    async fn store_tokens(&self, tokens: TokenPair) -> Result<()> {
        debug!("Persisting token pair");
        self.update(|state| {
            state.access_token = Some(tokens.access_token.as_str().to_string());
            state.refresh_token = tokens.refresh_token.map(|t| t.as_str().to_string());
        })
        .await
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        debug!("Clearing stored credentials");
        self.update(|state| {
            state.access_token = None;
            state.refresh_token = None;
        })
        .await
    }
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .finish()
    }
}
