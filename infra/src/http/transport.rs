//! Verification transport backed by the AppVerify backend

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use av_core::{
    AuthToken, DeviceMetadata, FinalizeOutcome, InitiateOutcome, VerificationError,
    VerificationResult, VerificationTransportTrait,
};
use av_shared::utils::mask_phone_number;

use super::client::{describe_error, endpoint_base};
use super::dto;
use crate::InfrastructureError;

pub const INITIATE_PATH: &str = "sms";
pub const FINALIZE_PATH: &str = "code";

/// Sends form-encoded initiate and finalize requests
pub struct HttpVerificationTransport {
    client: Client,
    initiate_url: Url,
    finalize_url: Url,
}

impl HttpVerificationTransport {
    /// Create a transport for `base_url` (e.g. `https://av-api-sample.telesign.com/v1/appverify/`)
    pub fn new(client: Client, base_url: &str) -> Result<Self, InfrastructureError> {
        let base = endpoint_base(base_url)?;
        Ok(Self {
            client,
            initiate_url: base.join(INITIATE_PATH)?,
            finalize_url: base.join(FINALIZE_PATH)?,
        })
    }

    /// POST a form and return the status code with the raw body
    async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, String)],
    ) -> VerificationResult<(u16, Vec<u8>)> {
        let response = self
            .client
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;
        Ok((status, body.to_vec()))
    }
}

fn transport_error(url: &Url, error: &reqwest::Error) -> VerificationError {
    tracing::warn!(
        url = %url,
        error = %error,
        event = "transport_error",
        "Verification request failed"
    );
    VerificationError::TransportError {
        message: describe_error(error),
    }
}

#[async_trait]
impl VerificationTransportTrait for HttpVerificationTransport {
    async fn initiate(
        &self,
        token: &AuthToken,
        phone_number: &str,
        metadata: Option<&DeviceMetadata>,
    ) -> VerificationResult<InitiateOutcome> {
        let mut form = vec![
            ("jwt", token.value().to_string()),
            ("phone_number", phone_number.to_string()),
        ];
        if let Some(metadata) = metadata {
            form.extend(metadata.to_form_fields());
        }

        tracing::debug!(
            phone = %mask_phone_number(phone_number),
            fields = form.len(),
            event = "initiate_request",
            "Sending initiate request"
        );
        let (status, body) = self.post_form(&self.initiate_url, &form).await?;
        let outcome = dto::decode_initiate(status, &body)?;

        tracing::info!(
            status_code = outcome.status_code,
            message = %outcome.status_message,
            event = "initiate_succeeded",
            "SMS request accepted"
        );
        Ok(outcome)
    }

    async fn finalize(&self, request_id: &str, code: &str) -> VerificationResult<FinalizeOutcome> {
        let form = [
            ("request_id", request_id.to_string()),
            ("verification_code", code.to_string()),
        ];

        tracing::debug!(event = "finalize_request", "Sending finalize request");
        let (status, body) = self.post_form(&self.finalize_url, &form).await?;
        let outcome = dto::decode_finalize(status, &body)?;

        tracing::info!(
            status_code = outcome.status_code,
            message = %outcome.status_message,
            event = "finalize_succeeded",
            "Verification code accepted"
        );
        Ok(outcome)
    }
}
