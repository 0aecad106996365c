//! # Infrastructure Layer
//!
//! This crate implements the infrastructure side of the AppVerify client. It
//! provides concrete implementations of the ports defined in `av_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **HTTP**: reqwest-backed token provider and verification transport
//! - **Device**: host device metadata for initiate requests
//! - **Mock**: an in-process backend for offline development

use std::sync::Arc;
use std::time::Duration;

use av_core::{DeviceInfoTrait, TokenProviderTrait, VerificationTransportTrait};
use av_shared::{ApiProvider, AppConfig};

// Re-export core types for convenience
pub use av_core::errors::*;

/// Device metadata collection
pub mod device;

/// HTTP implementations of the token provider and transport
pub mod http;

/// Mock backend for development and testing
pub mod mock;

use device::SystemDeviceInfo;
use http::{HttpTokenProvider, HttpVerificationTransport};
use mock::{MockTokenProvider, MockVerificationTransport};

/// Concrete collaborators for the verification service
#[derive(Clone)]
pub struct VerificationBackend {
    pub token_provider: Arc<dyn TokenProviderTrait>,
    pub transport: Arc<dyn VerificationTransportTrait>,
    pub device_info: Arc<dyn DeviceInfoTrait>,
}

impl VerificationBackend {
    /// Replace the device metadata source
    pub fn with_device_info(mut self, device_info: Arc<dyn DeviceInfoTrait>) -> Self {
        self.device_info = device_info;
        self
    }
}

/// Create the backend selected by `api.provider`
///
/// # Arguments
///
/// * `config` - Application configuration
///
/// # Returns
///
/// * `Ok(VerificationBackend)` - HTTP or mock implementations
/// * `Err(InfrastructureError)` - The HTTP client or an endpoint URL could not be built
pub fn create_backend(config: &AppConfig) -> Result<VerificationBackend, InfrastructureError> {
    let device_info: Arc<dyn DeviceInfoTrait> = Arc::new(SystemDeviceInfo::default());

    match config.api.provider {
        ApiProvider::Http => {
            let client = http::build_client(Duration::from_secs(config.api.request_timeout_secs))?;
            let base_url = config.base_url();
            tracing::info!(
                provider = "http",
                environment = %config.environment,
                base_url = %base_url,
                event = "backend_created",
                "Using HTTP verification backend"
            );
            Ok(VerificationBackend {
                token_provider: Arc::new(HttpTokenProvider::new(
                    client.clone(),
                    &config.api.token_url,
                )?),
                transport: Arc::new(HttpVerificationTransport::new(client, &base_url)?),
                device_info,
            })
        }
        ApiProvider::Mock => {
            tracing::info!(provider = "mock", event = "backend_created", "Using mock verification backend");
            Ok(VerificationBackend {
                token_provider: Arc::new(MockTokenProvider::new()),
                transport: Arc::new(MockVerificationTransport::new()),
                device_info,
            })
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL error
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
