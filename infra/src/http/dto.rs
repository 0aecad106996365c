//! Wire format of the verification backend and response classification
//!
//! Exactly HTTP 200 is decoded as a success body. Every other status is
//! decoded as an error body carrying an application code and message. A body
//! that fails to decode on either path becomes `MalformedResponse`.

use serde::{Deserialize, Serialize};

use av_core::{FinalizeOutcome, InitiateOutcome, VerificationError, VerificationResult};

const HTTP_OK: u16 = 200;

/// `status` object present in every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDto {
    #[serde(default)]
    pub received_on_utc: String,
    pub code: i64,
    pub message: String,
}

/// Successful initiate body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiateResponseDto {
    pub status: StatusDto,
    pub request_id: String,
    pub timeout: u32,
    pub max_retries: u32,
}

/// Successful finalize body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponseDto {
    pub status: StatusDto,
}

/// Body of any non-200 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub status: StatusDto,
}

impl From<InitiateResponseDto> for InitiateOutcome {
    fn from(dto: InitiateResponseDto) -> Self {
        Self {
            request_id: dto.request_id,
            timeout_seconds: dto.timeout,
            max_retries: dto.max_retries,
            status_code: dto.status.code,
            status_message: dto.status.message,
        }
    }
}

impl From<FinalizeResponseDto> for FinalizeOutcome {
    fn from(dto: FinalizeResponseDto) -> Self {
        Self {
            status_code: dto.status.code,
            status_message: dto.status.message,
        }
    }
}

impl From<ErrorResponseDto> for VerificationError {
    fn from(dto: ErrorResponseDto) -> Self {
        VerificationError::ApplicationError {
            code: dto.status.code,
            message: dto.status.message,
        }
    }
}

/// Classify an initiate response
pub fn decode_initiate(http_status: u16, body: &[u8]) -> VerificationResult<InitiateOutcome> {
    if http_status != HTTP_OK {
        return Err(decode_error(http_status, body));
    }
    serde_json::from_slice::<InitiateResponseDto>(body)
        .map(InitiateOutcome::from)
        .map_err(|e| malformed("initiate", e))
}

/// Classify a finalize response
pub fn decode_finalize(http_status: u16, body: &[u8]) -> VerificationResult<FinalizeOutcome> {
    if http_status != HTTP_OK {
        return Err(decode_error(http_status, body));
    }
    serde_json::from_slice::<FinalizeResponseDto>(body)
        .map(FinalizeOutcome::from)
        .map_err(|e| malformed("finalize", e))
}

fn decode_error(http_status: u16, body: &[u8]) -> VerificationError {
    match serde_json::from_slice::<ErrorResponseDto>(body) {
        Ok(dto) => {
            tracing::info!(
                http_status,
                code = dto.status.code,
                message = %dto.status.message,
                event = "application_error",
                "Backend rejected request"
            );
            dto.into()
        }
        Err(e) => malformed(&format!("error (HTTP {http_status})"), e),
    }
}

fn malformed(kind: &str, error: serde_json::Error) -> VerificationError {
    tracing::warn!(kind, error = %error, event = "malformed_response", "Failed to decode response");
    VerificationError::MalformedResponse {
        message: format!("failed to decode {kind} response: {error}"),
    }
}
