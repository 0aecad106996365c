//! Successful backend responses, decoded from the wire.

/// Result of a successful initiate (SMS request)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateOutcome {
    /// Backend request id used by finalize
    pub request_id: String,
    /// Seconds the sent code stays valid
    pub timeout_seconds: u32,
    /// Retry allowance reported by the backend
    pub max_retries: u32,
    /// Application status code
    pub status_code: i64,
    /// Application status message
    pub status_message: String,
}

/// Result of a successful finalize (code check)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub status_code: i64,
    pub status_message: String,
}
