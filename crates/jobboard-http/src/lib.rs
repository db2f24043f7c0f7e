//! jobboard-http - Authenticated REST client for the jobboard backend.
//!
//! Every request carries the stored access token. When the backend rejects
//! it with a 401, the client exchanges the refresh token once and replays
//! the request; if that is impossible the session is cleared and the
//! original 401 is returned.
//!
//! # Example
//!
//! ```no_run
//! use jobboard_core::{Credentials, MemoryCredentialStore};
//! use jobboard_http::{AuthService, AuthenticatedClient, ClientConfig};
//!
//! # async fn example() -> Result<(), jobboard_core::Error> {
//! let client = AuthenticatedClient::with_store(ClientConfig::from_env()?, MemoryCredentialStore::new())?;
//! let auth = AuthService::new(client.clone());
//! auth.login(&Credentials::new("alice@example.com", "hunter22")).await?;
//!
//! let job: serde_json::Value = client.get_json("/jobs/42").await?;
//! println!("{}", job["title"]);
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod endpoints;
mod response;

pub use auth::AuthService;
pub use client::{AuthenticatedClient, RequestOptions};
pub use config::{ClientConfig, DEFAULT_TIMEOUT, RefreshPolicy};
pub use endpoints::{CurrentUser, Message, RegisteredUser, Registration};
pub use response::{ApiResponse, ResponseBody};
pub use tokio_util::sync::CancellationToken;
