use async_trait::async_trait;
use reqwest::{Method, Url, header::HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Header Flask-Security reads the session token from.
const AUTH_TOKEN_HEADER: &str = "Authentication-Token";

/// TransportError
///
/// Raised when a request never produced a usable response: connection refused,
/// DNS failure, or a body that is not the JSON the caller expected.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// ApiResponse
///
/// A completed HTTP exchange: the status code and the decoded JSON body.
/// A body that is empty or not JSON is represented as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// is_success
    ///
    /// Any 2xx. The backend answers creates with 201, exports with 202 and logout with
    /// 204, and all of them count.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// error_message
    ///
    /// Extracts the backend's error text: `error` first, then `message`, then the fallback.
    /// Flask-Security reports its own refusals (401/403) under `message`, while the
    /// quiz routes use `error`, so both are consulted. An empty string counts as absent.
    pub fn error_message(&self, fallback: &str) -> String {
        ["error", "message"]
            .iter()
            .find_map(|key| self.body.get(key).and_then(Value::as_str))
            .filter(|msg| !msg.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Decodes the body into `T`. A shape mismatch is reported as a transport failure.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| TransportError(format!("unexpected response body: {e}")))
    }
}

// 1. ApiClient Contract
/// ApiClient
///
/// The seam between the stores and the network. The stores only ever see this trait,
/// so the real HTTP client and the scripted mock are interchangeable.
///
/// Any response the server produced (2xx or not) is `Ok`; only the absence of a
/// response is an `Err`.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError>;

    /// Sets or clears the token attached to subsequent requests.
    /// Clients that do not authenticate by header may ignore it.
    fn set_auth_token(&self, _token: Option<String>) {}

    // --- Verb shorthands over `send` ---

    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, TransportError> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Partial updates: the backend keeps any field left out of `body`.
    async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, TransportError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.send(Method::DELETE, path, None).await
    }
}

/// ApiState
///
/// The shared handle both stores hold onto.
pub type ApiState = Arc<dyn ApiClient>;

/// Origin used only to borrow `Url`'s query encoder; it never leaves this module.
const QUERY_ORIGIN: &str = "http://localhost/";

/// path_with_query
///
/// Appends form-encoded query parameters to an API path. Parameters with an empty
/// value are left out, since the search endpoints treat a missing filter and an empty
/// one the same way. With nothing left to send, the path is returned unchanged.
pub fn path_with_query(path: &str, params: &[(&str, &str)]) -> String {
    let present: Vec<(&str, &str)> = params
        .iter()
        .copied()
        .filter(|(_, value)| !value.is_empty())
        .collect();
    if present.is_empty() {
        return path.to_string();
    }

    match Url::parse_with_params(QUERY_ORIGIN, &present) {
        Ok(url) => format!("{path}?{}", url.query().unwrap_or_default()),
        Err(e) => {
            tracing::warn!(error = %e, path, "could not encode query; sending without it");
            path.to_string()
        }
    }
}

// 2. The Real Implementation
/// HttpApiClient
///
/// `reqwest`-backed client. It keeps a cookie jar so the backend's session cookie
/// survives between calls, and attaches the auth token header once one is known.
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: RwLock<Option<String>>,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: RwLock::new(None),
        })
    }

    /// The origin every request path is appended to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // A poisoned lock reads as "no token"; the request then goes out unauthenticated
    // and the backend answers 401, which the stores already handle.
    fn current_token(&self) -> Option<String> {
        self.auth_token.read().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, %url, "sending request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = self.current_token() {
            if let Ok(value) = HeaderValue::from_str(&token) {
                request = request.header(AUTH_TOKEN_HEADER, value);
            }
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        // Logout and a few admin endpoints answer with an empty body.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        tracing::debug!(method = %method, %url, status, "response received");
        Ok(ApiResponse { status, body })
    }

    fn set_auth_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.auth_token.write() {
            *guard = token;
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// RecordedRequest
///
/// One call observed by `MockApiClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// MockApiClient
///
/// Scripted stand-in for the backend. Responses are registered per (method, path);
/// an unregistered route answers 404. Every call is recorded so tests can assert on
/// what was sent. With `should_fail` set, every call fails at the transport level.
#[derive(Default)]
pub struct MockApiClient {
    pub should_fail: bool,
    routes: Mutex<HashMap<(Method, String), ApiResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
    auth_token: Mutex<Option<String>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Registers (or replaces) the response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert((method, path.to_string()), ApiResponse::new(status, body));
        }
    }

    /// Builder form of `respond`.
    pub fn with_response(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.respond(method, path, status, body);
        self
    }

    /// Every call made so far, oldest first, including calls that failed.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// How many calls hit exactly `method path`. The path includes any query string.
    pub fn requests_to(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// The token the stores last installed, for asserting on sign-in and sign-out.
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError> {
        // Record first, so transport failures are visible in `requests()` too.
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                method: method.clone(),
                path: path.to_string(),
                body,
            });
        }

        if self.should_fail {
            return Err(TransportError(
                "Mock transport error: simulation requested".to_string(),
            ));
        }

        let response = self
            .routes
            .lock()
            .ok()
            .and_then(|routes| routes.get(&(method, path.to_string())).cloned());

        Ok(response.unwrap_or_else(|| {
            ApiResponse::new(404, serde_json::json!({ "error": "Not found" }))
        }))
    }

    fn set_auth_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.auth_token.lock() {
            *guard = token;
        }
    }
}
