//! Ports the session actor drives: token issuance, the verification backend
//! and device details.

use async_trait::async_trait;

use crate::domain::value_objects::{
    AuthToken, DeviceMetadata, FinalizeOutcome, InitiateOutcome,
};
use crate::errors::VerificationResult;

/// Trait for obtaining a fresh bearer token
#[async_trait]
pub trait TokenProviderTrait: Send + Sync {
    /// Fetch a single-use token for the customer.
    ///
    /// Fails with `InvalidCredential` before any network call when the
    /// identifier is malformed.
    async fn obtain_token(&self, customer_id: &str) -> VerificationResult<AuthToken>;
}

/// Trait for the verification backend
#[async_trait]
pub trait VerificationTransportTrait: Send + Sync {
    /// Ask the backend to send an SMS code to `phone_number`
    async fn initiate(
        &self,
        token: &AuthToken,
        phone_number: &str,
        metadata: Option<&DeviceMetadata>,
    ) -> VerificationResult<InitiateOutcome>;

    /// Check a user-supplied code against an earlier initiate
    async fn finalize(&self, request_id: &str, code: &str) -> VerificationResult<FinalizeOutcome>;
}

/// Trait for collecting optional device details
pub trait DeviceInfoTrait: Send + Sync {
    fn collect(&self) -> DeviceMetadata;
}
