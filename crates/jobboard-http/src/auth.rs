//! Explicit session flows on top of [`AuthenticatedClient`].

use tracing::{debug, info, instrument, warn};

use jobboard_core::error::AuthError;
use jobboard_core::{
    AccessToken, AuthRoute, Credentials, Method, RefreshToken, Result, Route, TokenPair,
};

use crate::client::{AuthenticatedClient, RequestOptions};
use crate::endpoints::{
    LoginRequest, LoginResponse, MeResponse, PasswordResetRequest, ResetPasswordRequest,
    VerifyCodeRequest,
};
use crate::{ApiResponse, CurrentUser, Message, RegisteredUser, Registration};

/// Login, logout and account management against the `/auth` routes.
///
/// Login and logout are the only flows besides refresh that write the
/// credential store.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: AuthenticatedClient,
}

impl AuthService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Authenticate with email and password and store the issued tokens.
    #[instrument(skip(self, credentials), fields(email = credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let body = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let options = RequestOptions::default().json_body(&body)?;
        let response: LoginResponse = self.send(Method::Post, AuthRoute::Login, options).await?.json()?;

        if response.refresh_token.is_none() {
            warn!("Login response carried no refresh token");
        }

        self.client
            .store()
            .store_tokens(TokenPair::new(
                AccessToken::new(response.access_token),
                response.refresh_token.map(RefreshToken::new),
            ))
            .await?;

        info!("Logged in");
        Ok(())
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser> {
        let options = RequestOptions::default().json_body(registration)?;
        let user: RegisteredUser = self
            .send(Method::Post, AuthRoute::Register, options)
            .await?
            .json()?;
        info!(id = %user.id, "Account registered");
        Ok(user)
    }

    /// The user the current session belongs to.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<CurrentUser> {
        let response: MeResponse = self
            .send(Method::Get, AuthRoute::Me, RequestOptions::default())
            .await?
            .json()?;
        Ok(response.user)
    }

    /// End the session.
    ///
    /// The server call is best-effort; local credentials are always removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if self.client.store().access_token().await?.is_some() {
            if let Err(err) = self
                .send(Method::Post, AuthRoute::Logout, RequestOptions::default())
                .await
            {
                warn!(error = %err, "Server logout failed");
            }
        } else {
            debug!("No active session, skipping server logout");
        }

        self.client.store().clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Revoke every session of the current user.
    ///
    /// Local credentials are removed even when the server call fails; the
    /// server's error is still returned.
    #[instrument(skip(self))]
    pub async fn logout_all(&self) -> Result<Message> {
        let result = self
            .send(Method::Post, AuthRoute::LogoutAll, RequestOptions::default())
            .await;

        self.client.store().clear().await?;

        let message = result?.json()?;
        info!("Logged out of all sessions");
        Ok(message)
    }

    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<Message> {
        let options = RequestOptions::default().query("token", token);
        self.send(Method::Get, AuthRoute::VerifyEmail, options)
            .await?
            .json()
    }

    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<Message> {
        let options = RequestOptions::default().json_body(&PasswordResetRequest { email })?;
        self.send(Method::Post, AuthRoute::RequestPasswordReset, options)
            .await?
            .json()
    }

    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Message> {
        let options =
            RequestOptions::default().json_body(&ResetPasswordRequest { token, password })?;
        self.send(Method::Post, AuthRoute::ResetPassword, options)
            .await?
            .json()
    }

    /// Explicitly exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.client.refresh_session().await
    }

    /// Ask the backend to send a verification code for a profile change.
    #[instrument(skip(self))]
    pub async fn request_profile_code(&self) -> Result<Message> {
        self.require_session().await?;
        self.send(
            Method::Post,
            AuthRoute::ProfileRequestCode,
            RequestOptions::default(),
        )
        .await?
        .json()
    }

    #[instrument(skip(self, code))]
    pub async fn verify_profile_code(&self, code: &str) -> Result<Message> {
        self.require_session().await?;
        let options = RequestOptions::default().json_body(&VerifyCodeRequest { code })?;
        self.send(Method::Post, AuthRoute::ProfileVerifyCode, options)
            .await?
            .json()
    }

    /// Apply a profile change after the verification code was accepted.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, changes: &serde_json::Value) -> Result<Message> {
        self.require_session().await?;
        let options = RequestOptions::default().json(changes.clone());
        self.send(Method::Put, AuthRoute::ProfileUpdate, options)
            .await?
            .json()
    }

    async fn require_session(&self) -> Result<()> {
        let store = self.client.store();
        if store.access_token().await?.is_none() && store.refresh_token().await?.is_none() {
            return Err(AuthError::NotLoggedIn.into());
        }
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        route: AuthRoute,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        self.client
            .request(method, route.path(), options.route(Route::Auth(route)))
            .await
    }
}
