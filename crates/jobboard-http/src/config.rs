//! Client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use jobboard_core::error::InvalidInputError;
use jobboard_core::{ApiUrl, Result};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "JOBBOARD_API_URL";

/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "JOBBOARD_TIMEOUT_SECS";

/// Timeout applied to requests that don't set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How concurrent 401s are turned into refresh calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Refreshes are serialized; requests that fail while another refresh is
    /// running reuse its token instead of issuing their own.
    #[default]
    Coalesce,
    /// Every failed request performs its own refresh.
    Independent,
}

/// Configuration for [`AuthenticatedClient`](crate::AuthenticatedClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root for all relative request URLs.
    pub base_url: ApiUrl,
    /// Headers merged into every request; per-request headers win.
    pub default_headers: BTreeMap<String, String>,
    /// Per-request timeout unless overridden; `None` disables it.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub refresh_policy: RefreshPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(ApiUrl::default())
    }
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            base_url,
            default_headers,
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("jobboard/", env!("CARGO_PKG_VERSION")).to_string(),
            refresh_policy: RefreshPolicy::default(),
        }
    }

    /// Build a configuration from `JOBBOARD_API_URL` and `JOBBOARD_TIMEOUT_SECS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let base_url = match std::env::var(API_URL_ENV) {
            Ok(url) => ApiUrl::new(url)?,
            Err(_) => ApiUrl::default(),
        };

        let mut config = Self::new(base_url);

        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| InvalidInputError::Other {
                message: format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, secs),
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.default_headers
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.to_string(), "http://localhost:5000/api");
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config.refresh_policy, RefreshPolicy::Coalesce);
        assert_eq!(
            config.default_headers.get("accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn header_names_are_normalized() {
        let config = ClientConfig::default().with_header("X-Client", "cli");
        assert_eq!(
            config.default_headers.get("x-client").map(String::as_str),
            Some("cli")
        );
    }
}
