//! Verification API and token endpoint configuration

use serde::{Deserialize, Serialize};
use std::env;

use super::environment::Environment;

/// Default host issuing mobile verification tokens
pub const DEFAULT_TOKEN_URL: &str = "https://tokengen.telesign.com";

/// Placeholder customer id shipped with the demo; it is not a valid credential
pub const PLACEHOLDER_CUSTOMER_ID: &str = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX";

/// Which backend implementation to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    /// Real HTTPS endpoints
    Http,
    /// In-process mock backend
    Mock,
}

impl std::str::FromStr for ApiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "https" => Ok(ApiProvider::Http),
            "mock" => Ok(ApiProvider::Mock),
            _ => Err(format!("Invalid API provider: {}", s)),
        }
    }
}

/// Endpoint configuration for token generation and the verification API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Backend implementation
    #[serde(default = "default_provider")]
    pub provider: ApiProvider,

    /// Overrides the environment's base URL when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Scheme and host of the token endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Customer identifier used to request tokens
    #[serde(default = "default_customer_id")]
    pub customer_id: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attach optional device metadata to initiate requests
    #[serde(default = "default_send_device_metadata")]
    pub send_device_metadata: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            token_url: default_token_url(),
            customer_id: default_customer_id(),
            request_timeout_secs: default_request_timeout(),
            send_device_metadata: default_send_device_metadata(),
        }
    }
}

impl ApiConfig {
    /// Load from `APPVERIFY_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env::var("APPVERIFY_PROVIDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider),
            base_url: env::var("APPVERIFY_BASE_URL").ok().filter(|v| !v.is_empty()),
            token_url: env::var("APPVERIFY_TOKEN_URL").unwrap_or(defaults.token_url),
            customer_id: env::var("APPVERIFY_CUSTOMER_ID").unwrap_or(defaults.customer_id),
            request_timeout_secs: env::var("APPVERIFY_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            send_device_metadata: env::var("APPVERIFY_SEND_DEVICE_METADATA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.send_device_metadata),
        }
    }

    /// Set the customer id
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    /// Set an explicit base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Base URL for the given environment, honouring the override
    pub fn resolved_base_url(&self, environment: Environment) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| environment.base_url().to_string())
    }
}

fn default_provider() -> ApiProvider {
    ApiProvider::Http
}

fn default_token_url() -> String {
    String::from(DEFAULT_TOKEN_URL)
}

fn default_customer_id() -> String {
    String::from(PLACEHOLDER_CUSTOMER_ID)
}

fn default_request_timeout() -> u64 {
    30
}

fn default_send_device_metadata() -> bool {
    true
}
