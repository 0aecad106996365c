//! Token provider backed by the token generation endpoint

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use av_core::{AuthToken, CustomerId, TokenProviderTrait, VerificationError, VerificationResult};

use super::client::{describe_error, endpoint_base};
use crate::InfrastructureError;

/// Path of the token endpoint relative to the token host
pub const TOKEN_PATH: &str = "v1/mobile/verification/token/";

/// Fetches a fresh bearer token for every initiate and resend
pub struct HttpTokenProvider {
    client: Client,
    token_base: Url,
}

impl HttpTokenProvider {
    /// Create a token provider for `token_url` (scheme and host, e.g. `https://tokengen.telesign.com`)
    pub fn new(client: Client, token_url: &str) -> Result<Self, InfrastructureError> {
        let token_base = endpoint_base(token_url)?.join(TOKEN_PATH)?;
        Ok(Self { client, token_base })
    }

    fn token_endpoint(&self, customer_id: &str) -> VerificationResult<Url> {
        self.token_base
            .join(customer_id)
            .map_err(|e| VerificationError::TokenServiceUnreachable {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl TokenProviderTrait for HttpTokenProvider {
    async fn obtain_token(&self, customer_id: &str) -> VerificationResult<AuthToken> {
        CustomerId::parse(customer_id)?;
        let url = self.token_endpoint(customer_id.trim())?;

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, event = "token_fetch_failed", "Token service unreachable");
            VerificationError::TokenServiceUnreachable {
                message: describe_error(&e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                http_status = status.as_u16(),
                event = "token_fetch_failed",
                "Token service returned an error status"
            );
            return Err(VerificationError::TokenServiceUnreachable {
                message: format!("HTTP {status}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| VerificationError::TokenServiceUnreachable {
                message: describe_error(&e),
            })?;

        let token = decode_token(&body)?;
        tracing::debug!(event = "token_obtained", "Obtained verification token");
        Ok(token)
    }
}

/// Interpret a token response body; it must be non-blank ASCII
pub fn decode_token(body: &[u8]) -> VerificationResult<AuthToken> {
    if !body.is_ascii() {
        return Err(VerificationError::TokenDecodeFailed);
    }
    let text = std::str::from_utf8(body).map_err(|_| VerificationError::TokenDecodeFailed)?;
    let token = text.trim();
    if token.is_empty() {
        return Err(VerificationError::TokenDecodeFailed);
    }
    Ok(AuthToken::new(token))
}
