//! Configuration for Terraform Enterprise clients.
//!
//! Holds the API address, token and TLS/timeout settings, with validation and
//! an environment-variable loader (`TFE_ADDRESS`, `TFE_TOKEN`).

use crate::Error;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = "https://app.terraform.io";

/// API base path appended to the address.
pub const DEFAULT_BASE_PATH: &str = "/api/v2/";

/// Environment variable holding the API address.
pub const ADDRESS_ENV: &str = "TFE_ADDRESS";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "TFE_TOKEN";

/// Configuration for a Terraform Enterprise client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TfeClientConfig {
    /// Address of the Terraform Enterprise instance
    #[validate(url)]
    pub address: String,

    /// API base path
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// API token, never serialized
    #[serde(skip)]
    pub token: Option<SecretString>,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl TfeClientConfig {
    /// Create a new client configuration for the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid URL.
    pub fn new(address: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            address: address.into(),
            ..Self::default()
        };

        config.validate()?;

        Ok(config)
    }

    /// Load the configuration from `TFE_ADDRESS` and `TFE_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if `TFE_TOKEN` is unset or the address is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(ADDRESS_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

        let token = lookup(TOKEN_ENV)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::ConfigError(format!("{TOKEN_ENV} is not set")))?;

        Ok(Self::new(address)?.with_token(token))
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the API base path.
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the API root, e.g. `https://app.terraform.io/api/v2/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address or base path cannot be parsed.
    pub fn api_url(&self) -> Result<Url, Error> {
        let address = Url::parse(&self.address)
            .map_err(|e| Error::ConfigError(format!("Invalid address: {e}")))?;

        let mut base_path = self.base_path.clone();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }

        address
            .join(&base_path)
            .map_err(|e| Error::ConfigError(format!("Invalid base path: {e}")))
    }
}

impl Default for TfeClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            base_path: default_base_path(),
            token: None,
            tls_verify: default_tls_verify(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_new() {
        let config = TfeClientConfig::new("https://tfe.example.com").unwrap();
        assert_eq!(config.address, "https://tfe.example.com");
        assert_eq!(config.base_path, "/api/v2/");
        assert!(config.token.is_none());
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_invalid_url() {
        let result = TfeClientConfig::new("not-a-url");
        match result {
            Err(Error::ConfigError(message)) => {
                assert!(message.starts_with("Invalid configuration:"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_config_builder() {
        let config = TfeClientConfig::new("https://tfe.example.com")
            .unwrap()
            .with_token("secret-token")
            .with_tls_verify(false)
            .with_timeout(60);

        assert_eq!(
            config.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("secret-token".to_string())
        );
        assert!(!config.tls_verify);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_default() {
        let config = TfeClientConfig::default();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_url() {
        let config = TfeClientConfig::new("https://tfe.example.com:8443").unwrap();
        assert_eq!(
            config.api_url().unwrap().as_str(),
            "https://tfe.example.com:8443/api/v2/"
        );

        let config = config.with_base_path("/custom/api");
        assert_eq!(
            config.api_url().unwrap().as_str(),
            "https://tfe.example.com:8443/custom/api/"
        );
    }

    #[test]
    fn test_from_lookup() {
        let config = TfeClientConfig::from_lookup(lookup(&[
            (ADDRESS_ENV, "https://tfe.internal"),
            (TOKEN_ENV, "abc"),
        ]))
        .unwrap();
        assert_eq!(config.address, "https://tfe.internal");
        assert!(config.token.is_some());
    }

    #[test]
    fn test_from_lookup_defaults_address() {
        let config = TfeClientConfig::from_lookup(lookup(&[(TOKEN_ENV, "abc")])).unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn test_from_lookup_requires_token() {
        let err = TfeClientConfig::from_lookup(lookup(&[(ADDRESS_ENV, "https://tfe.internal")]))
            .unwrap_err();
        assert_eq!(err, Error::ConfigError("TFE_TOKEN is not set".to_string()));
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = TfeClientConfig::default().with_token("do-not-leak");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("do-not-leak"));
        assert!(!json.contains("token"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("do-not-leak"));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: TfeClientConfig =
            serde_json::from_str(r#"{"address": "https://tfe.example.com"}"#).unwrap();
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert!(config.tls_verify);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = TfeClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 301;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 30;
        assert!(config.validate().is_ok());
    }
}
