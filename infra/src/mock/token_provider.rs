//! Mock token provider

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use av_core::{AuthToken, CustomerId, TokenProviderTrait, VerificationError, VerificationResult};

/// Issues random tokens after validating the customer id like the real service
#[derive(Clone, Default)]
pub struct MockTokenProvider {
    /// Counter for tracking number of tokens issued
    issued: Arc<AtomicU64>,
    /// Whether to simulate an unreachable token service
    simulate_failure: bool,
}

impl MockTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(simulate_failure: bool) -> Self {
        Self {
            simulate_failure,
            ..Self::default()
        }
    }

    /// Get the total number of tokens issued
    pub fn issued_count(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProviderTrait for MockTokenProvider {
    async fn obtain_token(&self, customer_id: &str) -> VerificationResult<AuthToken> {
        // The mock accepts the placeholder id so the demo runs without credentials
        if customer_id.trim() != av_shared::config::api::PLACEHOLDER_CUSTOMER_ID {
            CustomerId::parse(customer_id)?;
        }

        if self.simulate_failure {
            tracing::warn!(provider = "mock", event = "token_fetch_failed", "Simulating token failure");
            return Err(VerificationError::TokenServiceUnreachable {
                message: "simulated token service failure".to_string(),
            });
        }

        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(AuthToken::new(format!("mock-{}", Uuid::new_v4().simple())))
    }
}
