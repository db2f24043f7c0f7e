//! Error types for the jobboard client.
//!
//! A single error type with explicit variants for transport, cancellation,
//! API status, explicit-auth, input, response decoding and credential
//! storage failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for jobboard client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, malformed exchange).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The backend answered with a non-success status.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Errors from the explicit session flows (login, refresh, logout).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A success response whose body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Credential store failures.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if this is a 401 response from the backend.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Api(err) if err.is_unauthorized())
    }

    /// Returns the HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Errors raised by explicit session operations.
///
/// The transparent refresh path never produces these; it surfaces the
/// original 401 instead.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Refresh token is missing, invalid or expired.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// No session is stored.
    #[error("not logged in")]
    NotLoggedIn,
}

/// A non-success response from the REST backend.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Error code or short error text (`error` field), if present.
    pub error: Option<String>,
    /// Human readable message (`message` or `msg` field), if present.
    pub message: Option<String>,
    /// Structured validation details, if present.
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
            details: None,
        }
    }

    /// Build an API error from a status and a raw response body.
    ///
    /// The body is parsed leniently: JSON objects contribute their `error`,
    /// `message`/`msg` and `details` fields, anything else is ignored.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice(body) else {
            return Self::new(status, None, None);
        };

        let text = |key: &str| {
            fields
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Self {
            status,
            error: text("error"),
            message: text("message").or_else(|| text("msg")),
            details: fields.get("details").cloned(),
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A header name or value that cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored state could not be parsed or written.
    #[error("corrupt credential state: {message}")]
    Corrupt { message: String },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_parses_error_and_message() {
        let err = ApiError::from_body(401, br#"{"error": "invalid credentials"}"#);
        assert_eq!(err.status, 401);
        assert_eq!(err.error.as_deref(), Some("invalid credentials"));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "HTTP 401 [invalid credentials]");
    }

    #[test]
    fn api_error_falls_back_to_msg_field() {
        let err = ApiError::from_body(404, br#"{"msg": "gone", "details": {"id": 3}}"#);
        assert_eq!(err.message.as_deref(), Some("gone"));
        assert_eq!(err.details, Some(serde_json::json!({"id": 3})));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn api_error_tolerates_non_json_body() {
        let err = ApiError::from_body(500, b"Internal Server Error");
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(err.error.is_none());
        assert!(err.message.is_none());
    }

    #[test]
    fn unauthorized_helper_only_matches_401() {
        let unauthorized = Error::Api(ApiError::new(401, None, None));
        let forbidden = Error::Api(ApiError::new(403, None, None));
        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
        assert!(!Error::Cancelled.is_unauthorized());
        assert_eq!(forbidden.status(), Some(403));
        assert_eq!(Error::Cancelled.status(), None);
    }
}
