//! Mock verification transport

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use av_core::errors::app_codes::CODE_MISMATCH;
use av_core::{
    AuthToken, DeviceMetadata, FinalizeOutcome, InitiateOutcome, VerificationError,
    VerificationResult, VerificationTransportTrait,
};
use av_shared::utils::mask_phone_number;

/// Code every mock SMS carries unless configured otherwise
pub const DEFAULT_MOCK_CODE: &str = "123456";
/// Verification timeout reported by the mock backend
pub const DEFAULT_MOCK_TIMEOUT_SECS: u32 = 120;
/// Application code for an unknown or already finalized request id
pub const REQUEST_NOT_FOUND: i64 = 1007;

const MESSAGE_IN_PROGRESS: i64 = 290;
const VERIFIED: i64 = 200;

/// Mock backend for development and testing
///
/// This implementation:
/// - Issues request ids and remembers them until finalized
/// - Prints the code it would have sent to the console
/// - Accepts a single configured code and reports 1008 for anything else
#[derive(Clone)]
pub struct MockVerificationTransport {
    accepted_code: String,
    timeout_seconds: u32,
    /// Outstanding request ids and the phone number each was issued for
    requests: Arc<Mutex<HashMap<String, String>>>,
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate transport failures (for testing)
    simulate_failure: bool,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockVerificationTransport {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_MOCK_CODE, DEFAULT_MOCK_TIMEOUT_SECS, true, false)
    }

    /// Create a mock transport with configurable options
    pub fn with_options(
        accepted_code: impl Into<String>,
        timeout_seconds: u32,
        console_output: bool,
        simulate_failure: bool,
    ) -> Self {
        Self {
            accepted_code: accepted_code.into(),
            timeout_seconds,
            requests: Arc::new(Mutex::new(HashMap::new())),
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn accepted_code(&self) -> &str {
        &self.accepted_code
    }

    fn requests(&self) -> VerificationResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.requests
            .lock()
            .map_err(|_| VerificationError::TransportError {
                message: "mock backend state poisoned".to_string(),
            })
    }
}

impl Default for MockVerificationTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationTransportTrait for MockVerificationTransport {
    async fn initiate(
        &self,
        token: &AuthToken,
        phone_number: &str,
        metadata: Option<&DeviceMetadata>,
    ) -> VerificationResult<InitiateOutcome> {
        if self.simulate_failure {
            tracing::warn!(provider = "mock", event = "transport_error", "Simulating initiate failure");
            return Err(VerificationError::TransportError {
                message: "simulated network failure".to_string(),
            });
        }
        if token.value().is_empty() {
            return Err(VerificationError::ApplicationError {
                code: -40001,
                message: "Missing jwt".to_string(),
            });
        }

        let request_id = Uuid::new_v4().simple().to_string().to_uppercase();
        self.requests()?
            .insert(request_id.clone(), phone_number.to_string());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        let masked_phone = mask_phone_number(phone_number);

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("📱 MOCK SMS SERVICE - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {}", masked_phone);
            println!("Request ID: {}", request_id);
            println!("Code: {}", self.accepted_code);
            println!("{}\n", "=".repeat(60));
        }

        tracing::info!(
            provider = "mock",
            phone = %masked_phone,
            request_id = %request_id,
            metadata_fields = metadata.map(|m| m.to_form_fields().len()).unwrap_or(0),
            event = "mock_sms_sent",
            "Mock SMS sent"
        );

        Ok(InitiateOutcome {
            request_id,
            timeout_seconds: self.timeout_seconds,
            max_retries: 3,
            status_code: MESSAGE_IN_PROGRESS,
            status_message: "Message in progress".to_string(),
        })
    }

    async fn finalize(&self, request_id: &str, code: &str) -> VerificationResult<FinalizeOutcome> {
        if self.simulate_failure {
            return Err(VerificationError::TransportError {
                message: "simulated network failure".to_string(),
            });
        }

        let mut requests = self.requests()?;
        if !requests.contains_key(request_id) {
            return Err(VerificationError::ApplicationError {
                code: REQUEST_NOT_FOUND,
                message: "Verification request not found".to_string(),
            });
        }
        if code != self.accepted_code {
            return Err(VerificationError::ApplicationError {
                code: CODE_MISMATCH,
                message: "Verification code mismatch".to_string(),
            });
        }

        requests.remove(request_id);
        Ok(FinalizeOutcome {
            status_code: VERIFIED,
            status_message: "Verification successful".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> MockVerificationTransport {
        MockVerificationTransport::with_options("654321", 30, false, false)
    }

    #[tokio::test]
    async fn test_initiate_then_finalize() {
        let transport = quiet();
        let outcome = transport
            .initiate(&AuthToken::new("tok"), "10123456789", None)
            .await
            .unwrap();
        assert_eq!(outcome.timeout_seconds, 30);
        assert!(!outcome.request_id.is_empty());
        assert_eq!(transport.message_count(), 1);

        let mismatch = transport.finalize(&outcome.request_id, "000000").await.unwrap_err();
        assert!(mismatch.is_code_mismatch());

        assert!(transport.finalize(&outcome.request_id, "654321").await.is_ok());

        // Finalized requests are forgotten
        let again = transport.finalize(&outcome.request_id, "654321").await.unwrap_err();
        assert!(matches!(
            again,
            VerificationError::ApplicationError { code: REQUEST_NOT_FOUND, .. }
        ));
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let transport = MockVerificationTransport::with_options(DEFAULT_MOCK_CODE, 30, false, true);
        assert!(matches!(
            transport.initiate(&AuthToken::new("tok"), "10123456789", None).await,
            Err(VerificationError::TransportError { .. })
        ));
    }
}
