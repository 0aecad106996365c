//! Error taxonomy for token generation, transport and session handling.

use thiserror::Error;

use crate::domain::entities::SessionStatus;

/// Application status codes returned by the verification backend
pub mod app_codes {
    /// The submitted code does not match the one sent by SMS
    pub const CODE_MISMATCH: i64 = 1008;
}

/// Every failure the verification core can report.
///
/// Display strings are user-facing; presentation layers show them verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid Customer Id for JWT")]
    InvalidCredential,

    #[error("JWT Server Connection Failed: {message}")]
    TokenServiceUnreachable { message: String },

    #[error("JWT Server Bad Response")]
    TokenDecodeFailed,

    #[error("Server Connection Failed: {message}")]
    TransportError { message: String },

    #[error("Server Bad Response: {message}")]
    MalformedResponse { message: String },

    #[error("{message}")]
    ApplicationError { code: i64, message: String },

    #[error("Please enter a valid phone number")]
    EmptyPhoneNumber,

    #[error("Please enter the verification code")]
    EmptyCode,

    #[error("AppVerify link could not be handled, please retry verification")]
    DeepLinkUnhandled,

    #[error("Verification timed out, please retry verification")]
    SessionExpired,

    #[error("A verification is already in progress ({status})")]
    SessionInProgress { status: SessionStatus },

    #[error("No verification is waiting for a code ({status})")]
    SessionNotActive { status: SessionStatus },

    #[error("Please wait {remaining_seconds} seconds before requesting a new code")]
    ResendCooldown { remaining_seconds: u64 },

    #[error("Verification service stopped")]
    ServiceStopped,
}

impl VerificationError {
    /// Backend rejection with the "code mismatch" application code
    pub fn is_code_mismatch(&self) -> bool {
        matches!(
            self,
            VerificationError::ApplicationError { code, .. } if *code == app_codes::CODE_MISMATCH
        )
    }

    /// Raised before anything reaches the network
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            VerificationError::EmptyPhoneNumber
                | VerificationError::EmptyCode
                | VerificationError::SessionInProgress { .. }
                | VerificationError::SessionNotActive { .. }
                | VerificationError::ResendCooldown { .. }
                | VerificationError::SessionExpired
        )
    }

    /// Whether a failed finalize leaves the session waiting for another code
    pub fn keeps_session_open(&self) -> bool {
        match self {
            VerificationError::ApplicationError { .. } => self.is_code_mismatch(),
            _ => true,
        }
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;
