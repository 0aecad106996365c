//! Configuration for the verification service

use std::time::Duration;

use av_shared::config::api::PLACEHOLDER_CUSTOMER_ID;
use av_shared::AppConfig;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Customer identifier used to fetch tokens
    pub customer_id: String,
    /// Time after entering the code screen, or after a resend, before another resend is allowed
    pub resend_cooldown: Duration,
    /// Period of the countdown timer
    pub tick_interval: Duration,
    /// Whether initiate requests carry device metadata
    pub send_device_metadata: bool,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            customer_id: PLACEHOLDER_CUSTOMER_ID.to_string(),
            resend_cooldown: Duration::from_secs(60),
            tick_interval: Duration::from_secs(1),
            send_device_metadata: true,
        }
    }
}

impl VerificationServiceConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            customer_id: config.api.customer_id.clone(),
            resend_cooldown: config.verification.resend_cooldown(),
            tick_interval: config.verification.tick_interval(),
            send_device_metadata: config.api.send_device_metadata,
        }
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    pub fn with_resend_cooldown(mut self, cooldown: Duration) -> Self {
        self.resend_cooldown = cooldown;
        self
    }
}
