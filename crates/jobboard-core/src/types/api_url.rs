//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// A validated REST API base URL.
///
/// This type ensures the URL is absolute and uses HTTPS (or HTTP for
/// localhost). Relative request paths are appended to it; absolute URLs are
/// used as given.
///
/// # Example
///
/// ```
/// use jobboard_core::ApiUrl;
///
/// let api = ApiUrl::new("https://jobs.example.com/api/").unwrap();
/// assert_eq!(api.join("/jobs/42"), "https://jobs.example.com/api/jobs/42");
/// assert_eq!(api.join("https://cdn.example.com/cv.pdf"), "https://cdn.example.com/cv.pdf");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: s.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(Self(url))
    }

    /// Returns the base without a trailing slash.
    fn base(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Resolve a request URL against this base.
    ///
    /// Absolute `http`/`https` URLs are returned unchanged.
    pub fn join(&self, path: &str) -> String {
        if parse_absolute(path).is_some() {
            return path.to_string();
        }
        format!("{}/{}", self.base(), path.trim_start_matches('/'))
    }

    /// Returns the path of `url` relative to this base, if it lies under it.
    ///
    /// Absolute URLs are compared structurally: scheme, host and port must
    /// match the base (case and default ports normalized) and the path must
    /// continue the base path. Relative inputs are returned as-is.
    pub fn relative_path(&self, url: &str) -> Option<String> {
        let Some(parsed) = parse_absolute(url) else {
            return Some(url.to_string());
        };

        if parsed.scheme() != self.0.scheme()
            || parsed.host() != self.0.host()
            || parsed.port_or_known_default() != self.0.port_or_known_default()
        {
            return None;
        }

        let rest = parsed
            .path()
            .strip_prefix(self.0.path().trim_end_matches('/'))?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }

        let mut relative = rest.to_string();
        if let Some(query) = parsed.query() {
            relative.push('?');
            relative.push_str(query);
        }
        Some(relative)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        // HTTPS, or HTTP for localhost
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Parse `url` if it is an absolute `http(s)` URL, in any letter case.
fn parse_absolute(url: &str) -> Option<Url> {
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

impl Default for ApiUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_API_URL).expect("default API URL is valid"))
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base())
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.base())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://jobs.example.com/api").unwrap();
        assert_eq!(api.host(), Some("jobs.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://127.0.0.1:5000/api").unwrap();
        assert_eq!(api.join("auth/me"), "http://127.0.0.1:5000/api/auth/me");
    }

    #[test]
    fn join_ignores_duplicate_slashes() {
        let api = ApiUrl::new("https://jobs.example.com/api/").unwrap();
        assert_eq!(api.join("/jobs/42"), "https://jobs.example.com/api/jobs/42");
        assert_eq!(api.join("jobs"), "https://jobs.example.com/api/jobs");
    }

    #[test]
    fn join_passes_absolute_urls_through() {
        let api = ApiUrl::new("https://jobs.example.com/api").unwrap();
        assert_eq!(
            api.join("https://files.example.com/cv/7"),
            "https://files.example.com/cv/7"
        );
    }

    #[test]
    fn root_base_url() {
        let api = ApiUrl::new("https://jobs.example.com").unwrap();
        assert_eq!(api.join("/auth/login"), "https://jobs.example.com/auth/login");
        assert_eq!(api.to_string(), "https://jobs.example.com");
    }

    #[test]
    fn relative_path_of_absolute_url() {
        let api = ApiUrl::new("https://jobs.example.com/api").unwrap();
        assert_eq!(
            api.relative_path("https://jobs.example.com/api/auth/login"),
            Some("/auth/login".to_string())
        );
        assert_eq!(api.relative_path("https://jobs.example.com/apix/a"), None);
        assert_eq!(api.relative_path("https://other.example.com/api/a"), None);
        assert_eq!(api.relative_path("/jobs"), Some("/jobs".to_string()));
    }

    #[test]
    fn relative_path_ignores_case_and_default_port() {
        let api = ApiUrl::new("https://jobs.example.com/api").unwrap();
        for url in [
            "HTTPS://JOBS.EXAMPLE.COM/api/auth/login",
            "https://jobs.example.com:443/api/auth/login",
            "https://Jobs.Example.com/api/auth/login?next=%2F",
        ] {
            let path = api.relative_path(url).unwrap();
            assert!(path.starts_with("/auth/login"), "{} -> {}", url, path);
        }
        assert_eq!(api.relative_path("http://jobs.example.com/api/auth/login"), None);
        assert_eq!(api.relative_path("https://jobs.example.com:8443/api/a"), None);
    }

    #[test]
    fn join_passes_upper_case_absolute_urls_through() {
        let api = ApiUrl::new("https://jobs.example.com/api").unwrap();
        assert_eq!(
            api.join("HTTPS://files.example.com/cv/7"),
            "HTTPS://files.example.com/cv/7"
        );
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ApiUrl::default().to_string(), DEFAULT_API_URL);
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://jobs.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ApiUrl::new("https://jobs.example.com/api?x=1").is_err());
    }
}
