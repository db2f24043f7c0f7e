//! jobboard-core - Core types and traits for the jobboard API client.

pub mod credentials;
pub mod error;
pub mod request;
pub mod route;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use request::{Method, PendingRequest, RequestBody, ResponseType};
pub use route::{AuthRoute, Route};
pub use store::MemoryCredentialStore;
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::CredentialStore;
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
