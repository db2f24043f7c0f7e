//! Authenticated HTTP client with transparent token refresh.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use jobboard_core::error::{AuthError, Error, InvalidInputError, TransportError};
use jobboard_core::{
    AccessToken, ApiUrl, AuthRoute, CredentialStore, Method, PendingRequest, RefreshToken,
    RequestBody, ResponseType, Result, Route, TokenPair,
};

use crate::config::{ClientConfig, RefreshPolicy};
use crate::endpoints::RefreshResponse;
use crate::response::{ApiResponse, RawReply};

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub body: Option<RequestBody>,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub response_type: ResponseType,
    pub cancel: Option<CancellationToken>,
    pub timeout: Option<Duration>,
    /// Explicit route tag; derived from the path when unset.
    pub route: Option<Route>,
}

impl RequestOptions {
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serializable: {}", e),
        })?;
        Ok(self.json(value))
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data,
        });
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }
}

/// REST client that attaches the stored access token to every request and
/// recovers once from an expired one.
///
/// Cheap to clone; clones share the connection pool, the credential store
/// and the refresh lock.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    refresh_lock: Mutex<()>,
}

impl AuthenticatedClient {
    /// Create a client over the given credential store.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    pub fn with_store<S>(config: ClientConfig, store: S) -> Result<Self>
    where
        S: CredentialStore + 'static,
    {
        Self::new(config, Arc::new(store))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &ApiUrl {
        &self.inner.config.base_url
    }

    /// The credential store this client reads and updates.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::Get, url, RequestOptions::default())
            .await
    }

    pub async fn post(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.request(Method::Post, url, RequestOptions::default().json(body))
            .await
    }

    pub async fn put(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.request(Method::Put, url, RequestOptions::default().json(body))
            .await
    }

    pub async fn patch(&self, url: &str, body: serde_json::Value) -> Result<ApiResponse> {
        self.request(Method::Patch, url, RequestOptions::default().json(body))
            .await
    }

    pub async fn delete(&self, url: &str) -> Result<ApiResponse> {
        self.request(Method::Delete, url, RequestOptions::default())
            .await
    }

    /// GET `url` and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get(url).await?.json()
    }

    /// POST `body` as JSON to `url` and deserialize the JSON reply.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::default().json_body(body)?;
        self.request(Method::Post, url, options).await?.json()
    }

    /// Issue a request through the authentication pipeline.
    ///
    /// A 401 from a non-exempt route triggers one refresh-and-retry. Every
    /// other failure, and a 401 that could not be recovered, is returned
    /// unchanged.
    #[instrument(skip(self, options))]
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(Error::Cancelled);
        }

        let route = options.route.unwrap_or_else(|| self.classify(url));
        let resolved = self.resolve(url, &options.query)?;

        let pending = PendingRequest::new(method, resolved, route)
            .with_headers(&self.inner.config.default_headers)
            .with_headers(&options.headers)
            .with_body(options.body.clone());

        self.execute(pending, &options).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Unlike the transparent path this reports failure: a rejected or
    /// missing refresh token clears the session and yields
    /// [`AuthError::RefreshTokenInvalid`]; transport errors are returned
    /// as-is and leave the session untouched.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<AccessToken> {
        let _serialized = self.inner.refresh_lock.lock().await;

        let Some(refresh_token) = self.inner.store.refresh_token().await? else {
            self.end_session().await;
            return Err(AuthError::RefreshTokenInvalid.into());
        };

        match self.exchange(&refresh_token, None, None).await {
            Ok(tokens) => {
                self.persist(&tokens).await?;
                info!("Session refreshed");
                Ok(tokens.access_token)
            }
            Err(err @ (Error::Api(_) | Error::InvalidResponse { .. })) => {
                warn!(error = %err, "Refresh token rejected, clearing session");
                self.end_session().await;
                Err(AuthError::RefreshTokenInvalid.into())
            }
            Err(err) => Err(err),
        }
    }

    fn classify(&self, url: &str) -> Route {
        self.base_url()
            .relative_path(url)
            .map(|path| Route::from_path(&path))
            .unwrap_or_default()
    }

    fn resolve(&self, url: &str, query: &[(String, String)]) -> Result<String> {
        let joined = self.base_url().join(url);
        if query.is_empty() {
            return Ok(joined);
        }

        let mut parsed = Url::parse(&joined).map_err(|e| InvalidInputError::Other {
            message: format!("invalid request URL '{}': {}", joined, e),
        })?;
        parsed.query_pairs_mut().extend_pairs(query);
        Ok(parsed.into())
    }

    async fn execute(&self, pending: PendingRequest, options: &RequestOptions) -> Result<ApiResponse> {
        let sent_with = self.inner.store.access_token().await?;
        let pending = pending.authorize(sent_with.as_ref());

        let reply = self.dispatch(&pending, options).await?;
        if reply.is_success() {
            return reply.into_response(options.response_type);
        }

        let error = reply.into_error();
        if !error.is_unauthorized() || !pending.can_refresh() {
            debug!(status = error.status, route = %pending.route(), "Request failed");
            return Err(error.into());
        }

        info!(route = %pending.route(), "Access token rejected, attempting refresh");

        let Some(token) = self.recover(sent_with.as_ref(), options).await? else {
            return Err(error.into());
        };

        let retry = pending.retry_with(&token);
        debug!("Retrying request with refreshed token");

        let reply = self.dispatch(&retry, options).await?;
        if reply.is_success() {
            reply.into_response(options.response_type)
        } else {
            Err(reply.into_error().into())
        }
    }

    /// Obtain a usable access token after a 401.
    ///
    /// Returns `Ok(None)` when the session cannot be recovered; the store has
    /// been cleared by then. Only cancellation is reported as an error.
    async fn recover(
        &self,
        sent_with: Option<&AccessToken>,
        options: &RequestOptions,
    ) -> Result<Option<AccessToken>> {
        let cancel = options.cancel.as_ref();

        let _serialized = match self.inner.config.refresh_policy {
            RefreshPolicy::Coalesce => {
                let guard = cancellable(cancel, async {
                    Ok(self.inner.refresh_lock.lock().await)
                })
                .await?;

                // Someone else refreshed (or gave up) while we waited.
                match self.inner.store.access_token().await {
                    Ok(current) if current.as_ref() != sent_with => {
                        debug!(
                            reuse = current.is_some(),
                            "Session changed during refresh wait"
                        );
                        return Ok(current);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "Failed to read credential store");
                        self.end_session().await;
                        return Ok(None);
                    }
                }

                Some(guard)
            }
            RefreshPolicy::Independent => None,
        };

        let refresh_token = match self.inner.store.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No refresh token stored, ending session");
                self.end_session().await;
                return Ok(None);
            }
            Err(err) => {
                warn!(error = %err, "Failed to read refresh token");
                self.end_session().await;
                return Ok(None);
            }
        };

        match self.exchange(&refresh_token, cancel, options.timeout).await {
            Ok(tokens) => {
                if let Err(err) = self.persist(&tokens).await {
                    warn!(error = %err, "Failed to persist refreshed token");
                }
                info!("Access token refreshed");
                Ok(Some(tokens.access_token))
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(err) => {
                warn!(error = %err, "Token refresh failed, ending session");
                self.end_session().await;
                Ok(None)
            }
        }
    }

    /// Call the refresh endpoint with the refresh token as bearer credential.
    async fn exchange(
        &self,
        refresh_token: &RefreshToken,
        cancel: Option<&CancellationToken>,
        timeout: Option<Duration>,
    ) -> Result<TokenPair> {
        let url = self.base_url().join(AuthRoute::Refresh.path());
        let timeout = timeout.or(self.inner.config.timeout);
        debug!(%url, "Exchanging refresh token");

        let mut headers = header_map(&self.inner.config.default_headers)?;
        headers.insert(AUTHORIZATION, header_value("authorization", &refresh_token.bearer())?);

        let builder = self.inner.http.post(&url).headers(headers);
        let reply = self.send(builder, timeout, cancel).await?;

        if !reply.is_success() {
            return Err(reply.into_error().into());
        }

        let body: RefreshResponse =
            serde_json::from_slice(&reply.body).map_err(|e| Error::InvalidResponse {
                message: format!("refresh response: {}", e),
            })?;

        Ok(TokenPair::new(
            AccessToken::new(body.access_token),
            body.refresh_token.map(RefreshToken::new),
        ))
    }

    async fn persist(&self, tokens: &TokenPair) -> Result<()> {
        self.inner
            .store
            .set_access_token(tokens.access_token.clone())
            .await?;
        if let Some(refresh) = &tokens.refresh_token {
            self.inner.store.set_refresh_token(refresh.clone()).await?;
        }
        Ok(())
    }

    async fn end_session(&self) {
        if let Err(err) = self.inner.store.clear().await {
            warn!(error = %err, "Failed to clear credential store");
        }
    }

    async fn dispatch(&self, pending: &PendingRequest, options: &RequestOptions) -> Result<RawReply> {
        let timeout = options.timeout.or(self.inner.config.timeout);
        debug!(
            method = %pending.method(),
            url = pending.url(),
            retried = pending.is_retried(),
            authorized = pending.header("authorization").is_some(),
            "Dispatching request"
        );

        let mut builder = self
            .inner
            .http
            .request(reqwest_method(pending.method()), pending.url());

        builder = match pending.body() {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { content_type, data }) => builder
                .header(CONTENT_TYPE, header_value("content-type", content_type)?)
                .body(data.clone()),
            None => builder,
        };

        builder = builder.headers(header_map(pending.headers())?);

        self.send(builder, timeout, options.cancel.as_ref()).await
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        timeout: Option<Duration>,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawReply> {
        let builder = match timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        cancellable(cancel, async {
            let response = builder
                .send()
                .await
                .map_err(|e| transport_error(e, timeout))?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(e, timeout))?;
            trace!(%status, len = body.len(), "Response received");

            Ok(RawReply {
                status,
                headers,
                body: body.to_vec(),
            })
        })
        .await
    }
}

/// Run `fut` unless `cancel` fires first.
async fn cancellable<T, F>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        None => fut.await,
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                result = fut => result,
            }
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        InvalidInputError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value(name, value)?);
    }
    Ok(map)
}

fn transport_error(err: reqwest::Error, timeout: Option<Duration>) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: timeout.map(|t| t.as_millis() as u64).unwrap_or_default(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.inner.config.base_url)
            .field("refresh_policy", &self.inner.config.refresh_policy)
            .field("store", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_core::MemoryCredentialStore;

    fn client() -> AuthenticatedClient {
        let config = ClientConfig::new(ApiUrl::new("https://jobs.example.com/api").unwrap());
        AuthenticatedClient::with_store(config, MemoryCredentialStore::new()).unwrap()
    }

    #[test]
    fn classifies_relative_and_absolute_urls() {
        let client = client();
        assert_eq!(client.classify("/auth/login"), Route::Auth(AuthRoute::Login));
        assert_eq!(
            client.classify("https://jobs.example.com/api/auth/register"),
            Route::Auth(AuthRoute::Register)
        );
        assert_eq!(
            client.classify("https://elsewhere.example.com/api/auth/login"),
            Route::Resource
        );
        assert_eq!(client.classify("/jobs/42"), Route::Resource);
        assert_eq!(
            client.classify("https://JOBS.example.com:443/api/auth/login"),
            Route::Auth(AuthRoute::Login)
        );
    }

    #[test]
    fn resolve_appends_query_pairs() {
        let client = client();
        let query = vec![
            ("token".to_string(), "a b".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        assert_eq!(
            client.resolve("/auth/verify-email", &query).unwrap(),
            "https://jobs.example.com/api/auth/verify-email?token=a+b&page=2"
        );
        assert_eq!(
            client.resolve("jobs", &[]).unwrap(),
            "https://jobs.example.com/api/jobs"
        );
    }

    #[test]
    fn header_map_rejects_invalid_values() {
        let mut headers = BTreeMap::new();
        headers.insert("x-bad".to_string(), "line\nbreak".to_string());
        let err = header_map(&headers).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(InvalidInputError::Header { .. })));
    }

    #[tokio::test]
    async fn pre_cancelled_request_is_not_sent() {
        let token = CancellationToken::new();
        token.cancel();
        let err = client()
            .request(Method::Get, "/jobs", RequestOptions::default().cancel(token))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn debug_hides_store() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("AuthenticatedClient"));
        assert!(debug.contains("[REDACTED]"));
    }
}
