//! Events, snapshots and actions exchanged with the verification machine

use serde::Serialize;

use crate::domain::entities::{SessionId, SessionStatus};
use crate::errors::VerificationError;

/// Identity of one network request; results carrying an older ticket are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session moved to a new state
    StatusChanged { status: SessionStatus },
    /// Countdown value after a tick or a fresh initiate
    Tick { remaining_seconds: u32 },
    /// The backend accepted the initiate and sent an SMS
    CodeSent { timeout_seconds: u32 },
    /// Resend is unavailable for the given number of seconds
    ResendLocked { seconds: u64 },
    /// The resend cooldown has elapsed
    ResendAvailable,
    /// The backend confirmed the code
    Success { message: String },
    /// A request failed; `retryable` is true when the session still accepts input
    Error { error: VerificationError, retryable: bool },
    /// The countdown reached zero
    Timeout,
}

/// Point-in-time view of the active session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub status: SessionStatus,
    pub phone_number: Option<String>,
    pub request_id: Option<String>,
    pub remaining_seconds: u32,
    pub max_retries: u32,
    pub resend_available: bool,
}

/// Work the driver performs on behalf of the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineAction {
    /// Fetch a token, then send the initiate request
    Initiate { ticket: Ticket, phone_number: String },
    /// Send the finalize request
    Finalize { ticket: Ticket, request_id: String, code: String },
    /// Start the one-second countdown for a session
    StartCountdown { session_id: SessionId },
    StopCountdown,
    /// Abort the request in flight
    CancelInFlight,
    Emit(SessionEvent),
}
