//! Verification state machine.
//!
//! The machine performs no I/O. Commands and completions go in, and a list of
//! [`MachineAction`]s comes out for the driver to execute. Time is supplied
//! by the caller so the cooldown can be exercised deterministically.

use std::time::{Duration, Instant};

use av_shared::utils::mask_phone_number;

use crate::domain::entities::{SessionId, SessionStatus, VerificationSession};
use crate::domain::value_objects::{FinalizeOutcome, InitiateOutcome};
use crate::errors::{VerificationError, VerificationResult};

use super::types::{MachineAction, SessionEvent, SessionSnapshot, Ticket};

/// Owner of the single verification session
#[derive(Debug)]
pub struct VerificationMachine {
    session: Option<VerificationSession>,
    /// Ticket of the request whose result is still expected
    pending: Option<Ticket>,
    next_ticket: u64,
    next_session_id: u64,
    resend_cooldown: Duration,
    resend_available_at: Option<Instant>,
    resend_announced: bool,
}

impl VerificationMachine {
    pub fn new(resend_cooldown: Duration) -> Self {
        Self {
            session: None,
            pending: None,
            next_ticket: 0,
            next_session_id: 0,
            resend_cooldown,
            resend_available_at: None,
            resend_announced: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map(|session| session.status)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&VerificationSession> {
        self.session.as_ref()
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let Some(session) = self.session.as_ref() else {
            return SessionSnapshot::default();
        };

        SessionSnapshot {
            session_id: Some(session.id),
            status: session.status,
            phone_number: Some(session.phone_number.clone()),
            request_id: session.has_request().then(|| session.request_id.clone()),
            remaining_seconds: session.remaining_seconds,
            max_retries: session.max_retries,
            resend_available: session.status == SessionStatus::AwaitingCode
                && self.resend_available_at.map_or(true, |at| now >= at),
        }
    }

    /// Start a new session for `phone_number`.
    ///
    /// # Returns
    ///
    /// * `Ok(actions)` - Session created in `Initiating` with an initiate request to run
    /// * `Err(VerificationError::EmptyPhoneNumber)` - Blank input, nothing changes
    /// * `Err(VerificationError::SessionInProgress)` - Another session has not ended
    pub fn submit_phone_number(
        &mut self,
        phone_number: &str,
    ) -> VerificationResult<Vec<MachineAction>> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(VerificationError::EmptyPhoneNumber);
        }

        let status = self.status();
        if status.is_in_progress() {
            return Err(VerificationError::SessionInProgress { status });
        }

        self.next_session_id += 1;
        let session = VerificationSession::new(SessionId::new(self.next_session_id), phone_number);
        tracing::info!(
            session_id = %session.id,
            phone = %mask_phone_number(phone_number),
            event = "session_started",
            "Verification session started"
        );

        self.session = Some(session);
        self.resend_available_at = None;
        self.resend_announced = false;
        let ticket = self.issue_ticket();

        Ok(vec![
            MachineAction::Emit(SessionEvent::StatusChanged {
                status: SessionStatus::Initiating,
            }),
            MachineAction::Initiate {
                ticket,
                phone_number: phone_number.to_string(),
            },
        ])
    }

    /// Deliver the outcome of a token fetch plus initiate
    pub fn initiate_completed(
        &mut self,
        ticket: Ticket,
        result: VerificationResult<InitiateOutcome>,
        now: Instant,
    ) -> Vec<MachineAction> {
        if !self.take_pending(ticket) {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let first_initiate = !session.has_request();
        let result = result.and_then(|outcome| {
            if outcome.request_id.trim().is_empty() {
                Err(VerificationError::MalformedResponse {
                    message: "missing request_id".to_string(),
                })
            } else {
                Ok(outcome)
            }
        });

        let mut actions = Vec::new();
        match result {
            Ok(outcome) => {
                session.apply_initiate(&outcome);
                tracing::info!(
                    session_id = %session.id,
                    timeout_seconds = outcome.timeout_seconds,
                    max_retries = outcome.max_retries,
                    status_code = outcome.status_code,
                    event = "code_sent",
                    "Verification code sent"
                );

                actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
                    status: SessionStatus::AwaitingCode,
                }));
                actions.push(MachineAction::Emit(SessionEvent::CodeSent {
                    timeout_seconds: outcome.timeout_seconds,
                }));
                actions.push(MachineAction::Emit(SessionEvent::Tick {
                    remaining_seconds: session.remaining_seconds,
                }));
                // A fresh timeout restarts the period so the first tick lands a full interval later
                actions.push(MachineAction::StartCountdown { session_id: session.id });

                if first_initiate {
                    self.resend_available_at = Some(now + self.resend_cooldown);
                    self.resend_announced = false;
                    actions.push(MachineAction::Emit(SessionEvent::ResendLocked {
                        seconds: self.resend_cooldown.as_secs(),
                    }));
                }
            }
            Err(error) if first_initiate => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %error,
                    event = "initiate_failed",
                    "Initiate failed, session discarded"
                );
                self.session = None;
                self.resend_available_at = None;
                actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
                    status: SessionStatus::Idle,
                }));
                actions.push(MachineAction::Emit(SessionEvent::Error {
                    error,
                    retryable: false,
                }));
            }
            Err(error) => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %error,
                    event = "resend_failed",
                    "Resend failed, previous code still valid"
                );
                session.status = SessionStatus::AwaitingCode;
                actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
                    status: SessionStatus::AwaitingCode,
                }));
                actions.push(MachineAction::Emit(SessionEvent::Error {
                    error,
                    retryable: true,
                }));
            }
        }
        actions
    }

    /// Submit a verification code for the active session.
    ///
    /// A code submitted while a finalize is already in flight supersedes it.
    pub fn submit_code(&mut self, code: &str) -> VerificationResult<Vec<MachineAction>> {
        let code = code.trim();
        if code.is_empty() {
            return Err(VerificationError::EmptyCode);
        }

        let status = self.status();
        match status {
            SessionStatus::Expired => return Err(VerificationError::SessionExpired),
            status if !status.accepts_code() => {
                return Err(VerificationError::SessionNotActive { status })
            }
            _ => {}
        }

        let superseded = self.pending.is_some();
        let ticket = self.issue_ticket();
        let session = self
            .session
            .as_mut()
            .ok_or(VerificationError::SessionNotActive { status })?;

        tracing::info!(
            session_id = %session.id,
            superseded,
            event = "code_submitted",
            "Verification code submitted"
        );

        let mut actions = Vec::new();
        if superseded {
            actions.push(MachineAction::CancelInFlight);
        }
        if session.status != SessionStatus::Verifying {
            session.status = SessionStatus::Verifying;
            actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
                status: SessionStatus::Verifying,
            }));
        }
        actions.push(MachineAction::Finalize {
            ticket,
            request_id: session.request_id.clone(),
            code: code.to_string(),
        });
        Ok(actions)
    }

    /// Deliver the outcome of a finalize request
    pub fn finalize_completed(
        &mut self,
        ticket: Ticket,
        result: VerificationResult<FinalizeOutcome>,
    ) -> Vec<MachineAction> {
        if !self.take_pending(ticket) {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.status != SessionStatus::Verifying {
            tracing::debug!(
                session_id = %session.id,
                status = %session.status,
                event = "finalize_ignored",
                "Finalize result arrived outside verifying"
            );
            return Vec::new();
        }

        match result {
            Ok(outcome) => {
                tracing::info!(
                    session_id = %session.id,
                    status_code = outcome.status_code,
                    event = "verification_succeeded",
                    "Phone number verified"
                );
                session.status = SessionStatus::Verified;
                vec![
                    MachineAction::StopCountdown,
                    MachineAction::Emit(SessionEvent::StatusChanged {
                        status: SessionStatus::Verified,
                    }),
                    MachineAction::Emit(SessionEvent::Success {
                        message: outcome.status_message,
                    }),
                ]
            }
            Err(error) if error.keeps_session_open() => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %error,
                    event = "verification_retryable",
                    "Finalize failed, waiting for another code"
                );
                session.status = SessionStatus::AwaitingCode;
                vec![
                    MachineAction::Emit(SessionEvent::StatusChanged {
                        status: SessionStatus::AwaitingCode,
                    }),
                    MachineAction::Emit(SessionEvent::Error {
                        error,
                        retryable: true,
                    }),
                ]
            }
            Err(error) => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %error,
                    event = "verification_failed",
                    "Finalize rejected, session failed"
                );
                session.status = SessionStatus::Failed;
                vec![
                    MachineAction::StopCountdown,
                    MachineAction::Emit(SessionEvent::StatusChanged {
                        status: SessionStatus::Failed,
                    }),
                    MachineAction::Emit(SessionEvent::Error {
                        error,
                        retryable: false,
                    }),
                ]
            }
        }
    }

    /// One countdown period elapsed for `session_id`.
    ///
    /// The countdown keeps running while a finalize or a resend is in flight.
    /// Reaching zero then aborts that request.
    pub fn tick(&mut self, session_id: SessionId, now: Instant) -> Vec<MachineAction> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.id != session_id {
            tracing::debug!(
                session_id = %session_id,
                active_session_id = %session.id,
                event = "stale_tick",
                "Dropping tick for a replaced session"
            );
            return Vec::new();
        }

        let mut actions = Vec::new();
        if session.status.is_in_progress() && !self.resend_announced {
            if let Some(available_at) = self.resend_available_at {
                if now >= available_at {
                    self.resend_announced = true;
                    actions.push(MachineAction::Emit(SessionEvent::ResendAvailable));
                }
            }
        }

        if !session.status.is_in_progress() || !session.has_request() {
            return actions;
        }

        let expired = session.count_down();
        actions.push(MachineAction::Emit(SessionEvent::Tick {
            remaining_seconds: session.remaining_seconds,
        }));

        if expired {
            tracing::info!(
                session_id = %session.id,
                status = %session.status,
                event = "session_expired",
                "Verification code expired"
            );
            session.status = SessionStatus::Expired;
            if self.pending.take().is_some() {
                actions.push(MachineAction::CancelInFlight);
            }
            actions.push(MachineAction::StopCountdown);
            actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
                status: SessionStatus::Expired,
            }));
            actions.push(MachineAction::Emit(SessionEvent::Timeout));
        }
        actions
    }

    /// Request a new code for the active session
    pub fn resend(&mut self, now: Instant) -> VerificationResult<Vec<MachineAction>> {
        let status = self.status();
        match status {
            SessionStatus::AwaitingCode => {}
            SessionStatus::Expired => return Err(VerificationError::SessionExpired),
            status => return Err(VerificationError::SessionNotActive { status }),
        }

        if let Some(available_at) = self.resend_available_at {
            if now < available_at {
                let left = available_at - now;
                let remaining_seconds = left.as_secs() + u64::from(left.subsec_nanos() > 0);
                return Err(VerificationError::ResendCooldown { remaining_seconds });
            }
        }

        let ticket = self.issue_ticket();
        self.resend_available_at = Some(now + self.resend_cooldown);
        self.resend_announced = false;

        let session = self
            .session
            .as_mut()
            .ok_or(VerificationError::SessionNotActive { status })?;
        session.status = SessionStatus::Initiating;
        tracing::info!(
            session_id = %session.id,
            phone = %mask_phone_number(&session.phone_number),
            event = "resend_requested",
            "Requesting a new verification code"
        );

        Ok(vec![
            MachineAction::Emit(SessionEvent::StatusChanged {
                status: SessionStatus::Initiating,
            }),
            MachineAction::Emit(SessionEvent::ResendLocked {
                seconds: self.resend_cooldown.as_secs(),
            }),
            MachineAction::Initiate {
                ticket,
                phone_number: session.phone_number.clone(),
            },
        ])
    }

    /// Drop the session. Idle stays idle without emitting anything.
    pub fn cancel(&mut self) -> Vec<MachineAction> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if session.status.is_in_progress() {
            actions.push(MachineAction::StopCountdown);
            if self.pending.is_some() {
                actions.push(MachineAction::CancelInFlight);
            }
        }
        tracing::info!(
            session_id = %session.id,
            status = %session.status,
            event = "session_cancelled",
            "Verification session cancelled"
        );

        self.pending = None;
        self.resend_available_at = None;
        self.resend_announced = false;
        actions.push(MachineAction::Emit(SessionEvent::StatusChanged {
            status: SessionStatus::Idle,
        }));
        actions
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket::new(self.next_ticket);
        self.pending = Some(ticket);
        ticket
    }

    /// Accept a completion only when it belongs to the request still expected
    fn take_pending(&mut self, ticket: Ticket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            tracing::debug!(
                ticket = ticket.value(),
                pending = ?self.pending.map(|pending| pending.value()),
                event = "stale_result",
                "Dropping result of a superseded request"
            );
            false
        }
    }
}
