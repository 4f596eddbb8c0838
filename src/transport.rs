//! # Transport Abstraction
//!
//! Resource clients describe each call as an [`ApiRequest`] and hand it to a
//! [`Transport`]. The transport owns everything below that line: URL joining,
//! authentication headers, timeouts, status checking and JSON decoding.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cloudify_rest_client::{ClientConfig, RestTransport, Transport};
//! use cloudify_rest_client::transport::ApiRequest;
//!
//! # async fn example() -> cloudify_rest_client::ClientResult<()> {
//! let transport = RestTransport::new(&ClientConfig::load()?)?;
//! let status = transport.send(ApiRequest::get("/status")).await?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::bytes_stream::FileUpload;
use crate::config::{AuthConfig, ClientConfig};
use crate::error::{ClientError, ClientResult};

const AUTH_TOKEN_HEADER: &str = "authentication-token";
const TENANT_HEADER: &str = "tenant";

/// Body of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Raw bytes streamed from a local file
    File(FileUpload),
}

/// A single HTTP call, relative to the transport's base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: RequestBody,
    /// When set, only this status counts as success
    pub expected_status: Option<u16>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: RequestBody::Empty,
            expected_status: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn with_json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_file(mut self, upload: FileUpload) -> Self {
        self.body = RequestBody::File(upload);
        self
    }

    #[must_use]
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// First value of query parameter `key`
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `status` completes this request successfully
    pub fn accepts(&self, status: u16) -> bool {
        match self.expected_status {
            Some(expected) => status == expected,
            None => (200..300).contains(&status),
        }
    }
}

/// Performs HTTP calls on behalf of the resource clients
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Get the endpoint URL.
    fn endpoint(&self) -> &str;

    /// Send one request and return the decoded JSON response body
    /// (`Value::Null` for an empty body).
    async fn send(&self, request: ApiRequest) -> ClientResult<Value>;
}

/// reqwest-backed transport
pub struct RestTransport {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
    auth: Option<AuthConfig>,
}

impl std::fmt::Debug for RestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTransport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.timeout_ms)
            .field("auth", &self.auth)
            .finish()
    }
}

impl RestTransport {
    /// Create a transport from validated configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::config_error(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("cloudify-rest-client/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(Self::default_headers(config)?)
            .build()
            .map_err(|e| ClientError::config_error(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            "Created RestTransport for base_url: {}, timeout: {}ms",
            base_url, config.timeout_ms
        );

        Ok(Self {
            client,
            base_url,
            timeout_ms: config.timeout_ms,
            auth: config.auth.clone(),
        })
    }

    fn default_headers(config: &ClientConfig) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(tenant) = &config.tenant {
            let value = HeaderValue::from_str(tenant)
                .map_err(|e| ClientError::config_error(format!("Invalid tenant name: {}", e)))?;
            headers.insert(HeaderName::from_static(TENANT_HEADER), value);
        }
        Ok(headers)
    }

    fn authenticate(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(AuthConfig::Token { token }) => builder.header(AUTH_TOKEN_HEADER, token),
            Some(AuthConfig::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            None => builder,
        }
    }

    /// Join `path` onto the base URL, keeping the base URL's own path prefix
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| ClientError::invalid_input(format!("Invalid URL path '{}': {}", path, e)))
    }
}

#[async_trait]
impl Transport for RestTransport {
    fn endpoint(&self) -> &str {
        self.base_url.as_str()
    }

    async fn send(&self, mut request: ApiRequest) -> ClientResult<Value> {
        let url = self.url_for(&request.path)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.authenticate(self.client.request(request.method.clone(), url));
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        builder = match std::mem::take(&mut request.body) {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::File(upload) => builder
                .header(reqwest::header::CONTENT_LENGTH, upload.total_bytes())
                .body(reqwest::Body::wrap_stream(upload.into_stream())),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !request.accepts(status.as_u16()) {
            let err = error_from_response(status, &text);
            error!(
                method = %request.method,
                path = %request.path,
                status = %status,
                error = %err,
                "Request failed"
            );
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Build the error for an unexpected status from the server's
/// `{"message": ..., "error_code": ...}` envelope, falling back to the raw text.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    let (message, error_code) = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => (
            map.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            map.get("error_code")
                .and_then(Value::as_str)
                .map(str::to_string),
        ),
        _ if body.trim().is_empty() => (
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            None,
        ),
        _ => (body.to_string(), None),
    };
    ClientError::from_status(status.as_u16(), message, error_code)
}
