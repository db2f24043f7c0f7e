//! Credential store trait.

use async_trait::async_trait;

use crate::{AccessToken, RefreshToken, Result, TokenPair};

/// Persistent holder of the session's access and refresh tokens.
///
/// The store is read at the start of every outbound request and written only
/// by login, logout, and the client's refresh paths.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the current access token, if any.
    async fn access_token(&self) -> Result<Option<AccessToken>>;

    /// Replace the access token.
    async fn set_access_token(&self, token: AccessToken) -> Result<()>;

    /// Remove the access token.
    async fn clear_access_token(&self) -> Result<()>;

    /// Returns the current refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>>;

    /// Replace the refresh token.
    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()>;

    /// Remove the refresh token.
    async fn clear_refresh_token(&self) -> Result<()>;

    /// Store the tokens issued by a login.
    ///
    /// A pair without a refresh token removes any previous one.
    async fn store_tokens(&self, tokens: TokenPair) -> Result<()> {
        self.set_access_token(tokens.access_token).await?;
        match tokens.refresh_token {
            Some(refresh) => self.set_refresh_token(refresh).await,
            None => self.clear_refresh_token().await,
        }
    }

    /// Remove both tokens.
    async fn clear(&self) -> Result<()> {
        self.clear_access_token().await?;
        self.clear_refresh_token().await
    }
}
