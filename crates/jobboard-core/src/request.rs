//! Request snapshot types shared by client implementations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};
use crate::route::Route;
use crate::tokens::AccessToken;

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// HTTP methods used against the REST backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", s),
            }
            .into()),
        }
    }
}

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as `application/json`.
    Json(serde_json::Value),
    /// Sent verbatim with the given content type.
    Bytes { content_type: String, data: Vec<u8> },
}

/// How a success response body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Structured JSON; an empty body decodes as `null`.
    #[default]
    Json,
    /// UTF-8 text.
    Text,
    /// Raw bytes (file downloads).
    Bytes,
}

/// Snapshot of a request, kept so it can be dispatched again after a refresh.
///
/// A snapshot is retried at most once: [`PendingRequest::retry_with`] consumes
/// it and yields one that can no longer enter the refresh branch.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    body: Option<RequestBody>,
    route: Route,
    retried: bool,
}

impl PendingRequest {
    pub fn new(method: Method, url: impl Into<String>, route: Route) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            route,
            retried: false,
        }
    }

    /// Add a header. Names are case-insensitive; later values win.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers<'a, I>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        headers
            .into_iter()
            .fold(self, |req, (name, value)| req.with_header(name, value.clone()))
    }

    pub fn with_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    /// Set or remove the bearer header from the current access token.
    pub fn authorize(mut self, token: Option<&AccessToken>) -> Self {
        match token {
            Some(token) => {
                self.headers.insert(AUTHORIZATION.to_string(), token.bearer());
            }
            None => {
                self.headers.remove(AUTHORIZATION);
            }
        }
        self
    }

    /// Consume this snapshot, producing the single retry with a new token.
    pub fn retry_with(self, token: &AccessToken) -> Self {
        let mut retry = self.authorize(Some(token));
        retry.retried = true;
        retry
    }

    /// Returns true if a 401 for this request may start a refresh.
    pub fn can_refresh(&self) -> bool {
        !self.retried && !self.route.is_refresh_exempt()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::AuthRoute;

    fn jobs_request() -> PendingRequest {
        PendingRequest::new(Method::Get, "http://localhost:5000/api/jobs/42", Route::Resource)
    }

    #[test]
    fn authorize_sets_bearer_header() {
        let req = jobs_request().authorize(Some(&AccessToken::new("tok")));
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
    }

    #[test]
    fn authorize_without_token_removes_header() {
        let req = jobs_request()
            .with_header("Authorization", "Bearer stale")
            .authorize(None);
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn retry_is_marked_and_reauthorized() {
        let req = jobs_request()
            .with_body(Some(RequestBody::Json(serde_json::json!({"a": 1}))))
            .authorize(Some(&AccessToken::new("expiredTok")));
        assert!(req.can_refresh());

        let retry = req.retry_with(&AccessToken::new("newTok"));
        assert!(retry.is_retried());
        assert!(!retry.can_refresh());
        assert_eq!(retry.header("authorization"), Some("Bearer newTok"));
        assert_eq!(retry.method(), Method::Get);
        assert!(retry.body().is_some());
    }

    #[test]
    fn exempt_routes_cannot_refresh() {
        let req = PendingRequest::new(
            Method::Post,
            "http://localhost:5000/api/auth/login",
            Route::Auth(AuthRoute::Login),
        );
        assert!(!req.can_refresh());

        let me = PendingRequest::new(
            Method::Get,
            "http://localhost:5000/api/auth/me",
            Route::Auth(AuthRoute::Me),
        );
        assert!(me.can_refresh());
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let req = jobs_request()
            .with_header("X-Trace", "1")
            .with_header("x-trace", "2");
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("X-TRACE"), Some("2"));
    }

    #[test]
    fn method_parsing() {
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!("TRACE".parse::<Method>().is_err());
    }
}
