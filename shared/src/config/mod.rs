//! Configuration module with business-specific sub-modules
//!
//! - `api` - token endpoint, verification API base URL, request timeouts
//! - `deep_link` - scheme and host that identify verification links
//! - `environment` - environment detection and logging configuration
//! - `verification` - resend cooldown and countdown tick period

pub mod api;
pub mod deep_link;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use api::{ApiConfig, ApiProvider};
pub use deep_link::DeepLinkConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::VerificationConfig;

/// Prefix for layered environment overrides, e.g. `APPVERIFY__API__CUSTOMER_ID`
const ENV_PREFIX: &str = "APPVERIFY";

/// Complete client configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Token and verification endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Deep link matching
    #[serde(default)]
    pub deep_link: DeepLinkConfig,

    /// Session timers
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults for a given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            api: ApiConfig::default(),
            deep_link: DeepLinkConfig::default(),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from plain environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            api: ApiConfig::from_env(),
            ..Self::for_environment(environment)
        }
    }

    /// Load layered configuration: environment defaults, then the optional
    /// `config.<env>.toml` file, then `APPVERIFY__*` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let environment = Environment::from_env();
        let defaults = Self::for_environment(environment);

        config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name(environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Base URL of the verification API after applying overrides
    pub fn base_url(&self) -> String {
        self.api.resolved_base_url(self.environment)
    }
}
