//! In-memory credential store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::CredentialStore;
use crate::{AccessToken, RefreshToken, Result, TokenPair};

#[derive(Debug, Default)]
struct StoredTokens {
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
}

/// Process-local credential store.
///
/// Cheap to clone; clones share the same slots.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    tokens: Arc<RwLock<StoredTokens>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding the given tokens.
    pub fn with_tokens(
        access_token: Option<AccessToken>,
        refresh_token: Option<RefreshToken>,
    ) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(StoredTokens {
                access_token,
                refresh_token,
            })),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.tokens.read().await.access_token.clone())
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        self.tokens.write().await.access_token = Some(token);
        Ok(())
    }

    async fn clear_access_token(&self) -> Result<()> {
        self.tokens.write().await.access_token = None;
        Ok(())
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.read().await.refresh_token.clone())
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        self.tokens.write().await.refresh_token = Some(token);
        Ok(())
    }

    async fn clear_refresh_token(&self) -> Result<()> {
        self.tokens.write().await.refresh_token = None;
        Ok(())
    }

    async fn store_tokens(&self, tokens: TokenPair) -> Result<()> {
        let mut stored = self.tokens.write().await;
        stored.access_token = Some(tokens.access_token);
        stored.refresh_token = tokens.refresh_token;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut stored = self.tokens.write().await;
        stored.access_token = None;
        stored.refresh_token = None;
        Ok(())
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
