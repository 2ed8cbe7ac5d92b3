//! The transport seam between resource clients and the network.
//!
//! Resource clients describe a call as an [`ApiRequest`] and hand it to a
//! [`Transport`]. [`HttpTransport`] is the reqwest implementation; tests plug in
//! their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use url::Url;

use crate::client::ClientConfig;
use crate::config::TfeClientConfig;
use crate::error::{ApiErrorDocument, Error, Result};
use crate::jsonapi::{Document, MEDIA_TYPE};

pub use reqwest::Method;

/// A request to the API, relative to the API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Resource path, e.g. `vars` or `vars/var-123`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(&'static str, String)>,
    /// Request payload.
    pub body: Option<Document>,
}

impl ApiRequest {
    /// Create a request without query or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `GET path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path` with a payload.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Document) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// `PATCH path` with a payload.
    #[must_use]
    pub fn patch(path: impl Into<String>, body: Document) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    /// `DELETE path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_body(mut self, body: Document) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests and decodes responses.
///
/// Implementations return `Ok(None)` for a successful response without a body,
/// [`Error::NotFound`] for 404, [`Error::Unauthorized`] for 401 and
/// [`Error::ServerError`] for any other failure status.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and decode the JSON:API response document.
    async fn send(&self, request: ApiRequest) -> Result<Option<Document>>;
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    config: TfeClientConfig,
    http_config: Option<ClientConfig>,
}

impl HttpTransportBuilder {
    /// Create a builder from a [`TfeClientConfig`].
    #[must_use]
    pub fn new(config: TfeClientConfig) -> Self {
        Self {
            config,
            http_config: None,
        }
    }

    /// Override the HTTP client configuration.
    ///
    /// Its timeout takes precedence over `request_timeout_secs`.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = Some(http_config);
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if no token is configured, the address is
    /// invalid or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport> {
        let base_url = self.config.api_url()?;

        let token = self
            .config
            .token
            .as_ref()
            .ok_or_else(|| Error::ConfigError("missing API token".to_string()))?;

        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::ConfigError("API token is not a valid header value".into()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));

        let http_config = self
            .http_config
            .unwrap_or_else(|| ClientConfig::new().with_timeout(self.config.timeout()));

        let mut builder = ClientBuilder::new()
            .user_agent(http_config.user_agent.as_str())
            .default_headers(headers)
            .timeout(http_config.timeout)
            .connect_timeout(http_config.connect_timeout);

        if !self.config.tls_verify {
            warn!("TLS verification disabled for TFE client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpTransport {
            http,
            base_url,
            timeout: http_config.timeout,
            enable_logging: http_config.enable_logging,
        })
    }
}

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
    timeout: Duration,
    enable_logging: bool,
}

impl HttpTransport {
    /// Construct a transport directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpTransportBuilder::build`].
    pub fn from_config(config: &TfeClientConfig) -> Result<Self> {
        HttpTransportBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: TfeClientConfig) -> HttpTransportBuilder {
        HttpTransportBuilder::new(config)
    }

    /// Return the API root URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Option<Document>> {
        let ApiRequest {
            method,
            path,
            query,
            body,
        } = request;

        let url = self.build_url(&path)?;

        if self.enable_logging {
            debug!(method = %method, path = %path, ?query, "Sending TFE request");
        }

        let mut builder = self.http.request(method.clone(), url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(document) = &body {
            let payload =
                serde_json::to_vec(document).map_err(|err| Error::EncodeError(err.to_string()))?;
            builder = builder.header(CONTENT_TYPE, MEDIA_TYPE).body(payload);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let error = map_status_to_error(status, &text);
            if error.should_log() {
                warn!(method = %method, path = %path, %status, "TFE request failed");
            } else {
                debug!(method = %method, path = %path, %status, "TFE request failed");
            }
            return Err(error);
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice::<Document>(&bytes)
            .map(Some)
            .map_err(|err| Error::DecodeError(format!("Invalid response for `{path}`: {err}")))
    }
}

fn map_status_to_error(status: StatusCode, body: &str) -> Error {
    let mut message = ApiErrorDocument::message_from_body(body);
    if message.trim().is_empty() {
        message = status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string);
    }

    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::ServerError(message),
    }
}
