//! Deep link configuration

use serde::{Deserialize, Serialize};

/// Which incoming URLs carry verification codes.
///
/// Links look like `<scheme>://<host>?<code>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeepLinkConfig {
    /// Optional scheme filter; empty (the default) accepts any scheme so
    /// links match on host alone
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Host that marks a link as a verification link
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for DeepLinkConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
        }
    }
}

impl DeepLinkConfig {
    /// Create a config for the given scheme and host
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }
}

fn default_scheme() -> String {
    String::new()
}

fn default_host() -> String {
    String::from("verify")
}
