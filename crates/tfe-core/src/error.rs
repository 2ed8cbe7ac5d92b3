//! Error types for Terraform Enterprise API operations.
//!
//! Local validation failures ([`Error::MissingField`], [`Error::InvalidIdentifier`])
//! are raised before any request is built. Everything else is reported by the
//! transport, either from the HTTP layer or from the server's JSON:API error body.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for Terraform Enterprise operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required option was absent or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A resource identifier failed the local structural check
    #[error("Invalid value for {0} ID")]
    InvalidIdentifier(&'static str),

    /// The server reports the referenced resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The server rejected the API token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success response from the server
    #[error("Server error: {0}")]
    ServerError(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// Request payload could not be encoded
    #[error("Failed to encode request: {0}")]
    EncodeError(String),

    /// Invalid endpoint or path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for Terraform Enterprise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON:API error document returned by the server on failure.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorDocument {
    /// Individual error objects
    #[serde(default)]
    pub errors: Vec<ApiErrorObject>,
}

/// A single JSON:API error object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorObject {
    /// HTTP status as a string
    #[serde(default)]
    pub status: Option<String>,
    /// Short summary
    #[serde(default)]
    pub title: Option<String>,
    /// Human-readable explanation
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorDocument {
    /// Extract a readable message from a raw response body.
    ///
    /// Falls back to the body itself when it is not a JSON:API error document
    /// or carries no usable details.
    #[must_use]
    pub fn message_from_body(body: &str) -> String {
        let Ok(document) = serde_json::from_str::<Self>(body) else {
            return body.to_string();
        };

        let details: Vec<&str> = document
            .errors
            .iter()
            .filter_map(|err| err.detail.as_deref().or(err.title.as_deref()))
            .filter(|message| !message.is_empty())
            .collect();

        if details.is_empty() {
            body.to_string()
        } else {
            details.join("\n")
        }
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::ServerError(_) => "SERVER_ERROR",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::EncodeError(_) => "ENCODE_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::ServerError(_) | Self::ConfigError(_) | Self::DecodeError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(format!("Invalid configuration: {err}"))
    }
}
