//! HTTP transport for the backend API.
//!
//! Every request carries the session credential when one exists. An
//! authorization failure tears the session down and sends the user back to
//! the login view once per failure wave: all requests that were sent with the
//! same credential belong to one wave, and only the first of them to come
//! back acts on it.

use reqwest::{Client, Method, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use suraksh_core::config::ClientConfig;
use suraksh_core::error::{Result, SurakshError};
use suraksh_core::navigation::{Navigator, Route};
use suraksh_core::session::CredentialSource;

/// Longest backend error text kept in an error message.
const MAX_DETAIL_LEN: usize = 300;

/// Per-request overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Deadline for the whole exchange. Falls back to the client default.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Single-file multipart upload.
    File {
        field: String,
        file_name: String,
        content: Vec<u8>,
    },
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| SurakshError::validation(format!("Invalid request body: {}", e)))
    }

    pub fn file(field: impl Into<String>, file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self::File {
            field: field.into(),
            file_name: file_name.into(),
            content,
        }
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    options: RequestOptions,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            options: RequestOptions::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.body(RequestBody::json(value)?))
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl TransportResponse {
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body. A body that does not match `T` is a validation
    /// failure, not a transport one.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            SurakshError::validation(format!("Unexpected response from backend: {}", e))
        })
    }
}

/// Credential-aware HTTP client.
///
/// Touches nothing but the credential source and the navigator.
pub struct TransportClient {
    client: Client,
    base_url: String,
    default_timeout: Duration,
    health_timeout: Duration,
    credentials: Arc<dyn CredentialSource>,
    navigator: Arc<dyn Navigator>,
    /// One past the newest credential generation whose 401 was acted on.
    handled_wave: AtomicU64,
}

impl TransportClient {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<dyn CredentialSource>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| SurakshError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config, credentials, navigator))
    }

    /// Uses a preconfigured reqwest client (proxies, TLS roots).
    pub fn with_client(
        client: Client,
        config: &ClientConfig,
        credentials: Arc<dyn CredentialSource>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            default_timeout: config.request_timeout,
            health_timeout: config.health_timeout,
            credentials,
            navigator,
            handled_wave: AtomicU64::new(0),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_timeout(&self) -> Duration {
        self.health_timeout
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends `method path` with `body`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<TransportResponse> {
        self.send(ApiRequest::new(method, path).body(body).options(options))
            .await
    }

    /// Sends a request and returns the response if the status is 2xx.
    ///
    /// # Errors
    ///
    /// - `Timeout` when the deadline elapses
    /// - `Connectivity` when the backend cannot be reached
    /// - `Authorization` on 401, after the session teardown has run
    /// - `Validation` on 400/422 or an unusable request body
    /// - `Http` for any other non-success status
    pub async fn send(&self, request: ApiRequest) -> Result<TransportResponse> {
        let timeout = request.options.timeout.unwrap_or(self.default_timeout);
        let url = self.url(&request.path);
        let (token, generation) = self.credentials.credential();

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::File {
                field,
                file_name,
                content,
            } => {
                let part = multipart::Part::bytes(content).file_name(file_name);
                builder.multipart(multipart::Form::new().part(field, part))
            }
        };

        tracing::debug!("[Transport] {} {}", request.method, url);
        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?
            .to_vec();

        if status.is_success() {
            return Ok(TransportResponse { status, body });
        }

        let detail = error_detail(&body, status);
        tracing::debug!(
            "[Transport] {} {} failed with {}: {}",
            request.method,
            url,
            status,
            detail
        );
        match status {
            StatusCode::UNAUTHORIZED => {
                self.handle_unauthorized(generation);
                Err(SurakshError::Authorization(detail))
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(SurakshError::Validation(detail))
            }
            _ => Err(SurakshError::Http {
                status: status.as_u16(),
                detail,
            }),
        }
    }

    /// Sends a request and decodes the JSON response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    /// Acts on an authorization failure for a request sent at `generation`.
    ///
    /// Safe to call from any number of concurrent completions: only the
    /// first failure of a wave tears the session down, and nothing happens
    /// for a wave older than the current credential.
    fn handle_unauthorized(&self, generation: u64) {
        let previous = self.handled_wave.fetch_max(generation + 1, Ordering::SeqCst);
        if previous > generation {
            tracing::debug!(
                "[Transport] 401 for generation {} already handled",
                generation
            );
            return;
        }

        if !self.credentials.revoke(generation) {
            tracing::debug!(
                "[Transport] 401 for superseded credential (generation {})",
                generation
            );
            return;
        }

        if self.navigator.current_route() == Route::Login {
            tracing::info!("[Transport] Session revoked while on the login view");
        } else {
            tracing::warn!("[Transport] Session revoked by backend, redirecting to login");
            self.navigator.navigate(Route::Login);
        }
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> SurakshError {
    if err.is_timeout() {
        SurakshError::Timeout {
            timeout_secs: timeout.as_secs_f64().ceil() as u64,
            message: err.to_string(),
        }
    } else if err.is_builder() {
        SurakshError::validation(format!("Invalid request: {}", err))
    } else if err.is_decode() {
        SurakshError::validation(format!("Unreadable response: {}", err))
    } else {
        SurakshError::connectivity(err.to_string())
    }
}

/// Extracts the backend's `{"detail": ...}` message, falling back to the raw
/// body or the status reason.
fn error_detail(body: &[u8], status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(other) => return truncate(other.to_string()),
            None => {}
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        truncate(text)
    }
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_DETAIL_LEN {
        let mut end = MAX_DETAIL_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("...");
    }
    text
}
