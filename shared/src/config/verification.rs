//! Client-side verification timing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timers owned by the verification session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Seconds the resend action stays locked after the code screen opens
    /// and after every resend
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_secs: u64,

    /// Countdown tick period in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: default_resend_cooldown(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl VerificationConfig {
    pub fn resend_cooldown(&self) -> Duration {
        Duration::from_secs(self.resend_cooldown_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn default_resend_cooldown() -> u64 {
    60
}

fn default_tick_interval() -> u64 {
    1000
}
