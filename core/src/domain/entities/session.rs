//! Verification session entity.

use std::fmt;

use serde::Serialize;

use crate::domain::value_objects::InitiateOutcome;

/// Process-local identity of one verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session exists
    #[default]
    Idle,
    /// Token fetch and initiate request in flight
    Initiating,
    /// SMS sent, waiting for the user to enter the code
    AwaitingCode,
    /// Finalize request in flight
    Verifying,
    /// Backend confirmed the code
    Verified,
    /// Backend rejected the session
    Failed,
    /// Countdown reached zero before verification
    Expired,
}

impl SessionStatus {
    /// The session has ended and accepts no further input
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Verified | SessionStatus::Failed | SessionStatus::Expired
        )
    }

    /// A session exists and has not ended
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            SessionStatus::Initiating | SessionStatus::AwaitingCode | SessionStatus::Verifying
        )
    }

    /// A verification code can be submitted in this state
    pub fn accepts_code(&self) -> bool {
        matches!(self, SessionStatus::AwaitingCode | SessionStatus::Verifying)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Initiating => "initiating",
            SessionStatus::AwaitingCode => "awaiting code",
            SessionStatus::Verifying => "verifying",
            SessionStatus::Verified => "verified",
            SessionStatus::Failed => "failed",
            SessionStatus::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// One attempt to verify a phone number.
///
/// `request_id` stays empty until the first initiate succeeds and is never
/// empty afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationSession {
    /// Local identity used to discard stale timer ticks
    pub id: SessionId,
    /// Digits only, country code first
    pub phone_number: String,
    /// Backend request id correlating initiate and finalize
    pub request_id: String,
    /// Seconds left before the code expires
    pub remaining_seconds: u32,
    /// Retry allowance reported by the backend
    pub max_retries: u32,
    /// Current lifecycle state
    pub status: SessionStatus,
}

impl VerificationSession {
    /// Start a session for a phone number; the initiate request is pending
    pub fn new(id: SessionId, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            phone_number: phone_number.into(),
            request_id: String::new(),
            remaining_seconds: 0,
            max_retries: 0,
            status: SessionStatus::Initiating,
        }
    }

    /// Whether an initiate has succeeded for this session
    pub fn has_request(&self) -> bool {
        !self.request_id.is_empty()
    }

    /// Store a successful initiate and wait for the code
    pub fn apply_initiate(&mut self, outcome: &InitiateOutcome) {
        self.request_id = outcome.request_id.clone();
        self.remaining_seconds = outcome.timeout_seconds;
        self.max_retries = outcome.max_retries;
        self.status = SessionStatus::AwaitingCode;
    }

    /// Count one second down. Returns true when the countdown has run out.
    pub fn count_down(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }
}
