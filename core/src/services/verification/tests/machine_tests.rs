//! Unit tests for the verification state machine

use std::time::{Duration, Instant};

use crate::domain::entities::{SessionId, SessionStatus};
use crate::errors::VerificationError;
use crate::services::verification::{MachineAction, SessionEvent, Ticket, VerificationMachine};

use super::mocks::{app_error, outcome, verified};

const COOLDOWN: Duration = Duration::from_secs(60);

fn initiate_ticket(actions: &[MachineAction]) -> Ticket {
    actions
        .iter()
        .find_map(|action| match action {
            MachineAction::Initiate { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("initiate action")
}

fn finalize_ticket(actions: &[MachineAction]) -> Ticket {
    actions
        .iter()
        .find_map(|action| match action {
            MachineAction::Finalize { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("finalize action")
}

fn events(actions: &[MachineAction]) -> Vec<SessionEvent> {
    actions
        .iter()
        .filter_map(|action| match action {
            MachineAction::Emit(event) => Some(event.clone()),
            _ => None,
        })
        .collect()
}

/// Machine with a session waiting for a code
fn awaiting(timeout_seconds: u32, now: Instant) -> (VerificationMachine, SessionId) {
    let mut machine = VerificationMachine::new(COOLDOWN);
    let actions = machine.submit_phone_number("10123456789").unwrap();
    let ticket = initiate_ticket(&actions);
    machine.initiate_completed(ticket, Ok(outcome("abcdefg", timeout_seconds)), now);
    let session_id = machine.session().unwrap().id;
    (machine, session_id)
}

#[test]
fn test_empty_phone_number_is_rejected_without_state_change() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    assert_eq!(
        machine.submit_phone_number("   "),
        Err(VerificationError::EmptyPhoneNumber)
    );
    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.pending_ticket().is_none());
}

#[test]
fn test_submit_phone_number_starts_initiating() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    let actions = machine.submit_phone_number("10123456789").unwrap();

    assert_eq!(machine.status(), SessionStatus::Initiating);
    assert!(matches!(
        &actions[..],
        [
            MachineAction::Emit(SessionEvent::StatusChanged { status: SessionStatus::Initiating }),
            MachineAction::Initiate { phone_number, .. },
        ] if phone_number == "10123456789"
    ));
}

#[test]
fn test_second_phone_number_while_in_progress_is_rejected() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    machine.submit_phone_number("10123456789").unwrap();
    assert_eq!(
        machine.submit_phone_number("10123456780"),
        Err(VerificationError::SessionInProgress { status: SessionStatus::Initiating })
    );
}

#[test]
fn test_initiate_success_stores_request_and_starts_timers() {
    let now = Instant::now();
    let mut machine = VerificationMachine::new(COOLDOWN);
    let ticket = initiate_ticket(&machine.submit_phone_number("10123456789").unwrap());

    let actions = machine.initiate_completed(ticket, Ok(outcome("abcdefg", 120)), now);

    let session = machine.session().unwrap();
    assert_eq!(session.status, SessionStatus::AwaitingCode);
    assert_eq!(session.request_id, "abcdefg");
    assert_eq!(session.remaining_seconds, 120);
    assert!(actions.contains(&MachineAction::StartCountdown { session_id: session.id }));
    assert_eq!(
        events(&actions),
        vec![
            SessionEvent::StatusChanged { status: SessionStatus::AwaitingCode },
            SessionEvent::CodeSent { timeout_seconds: 120 },
            SessionEvent::Tick { remaining_seconds: 120 },
            SessionEvent::ResendLocked { seconds: 60 },
        ]
    );

    let snapshot = machine.snapshot(now);
    assert_eq!(snapshot.request_id.as_deref(), Some("abcdefg"));
    assert!(!snapshot.resend_available);
    assert!(machine.snapshot(now + COOLDOWN).resend_available);
}

#[test]
fn test_initiate_with_empty_request_id_is_malformed() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    let ticket = initiate_ticket(&machine.submit_phone_number("10123456789").unwrap());

    let actions = machine.initiate_completed(ticket, Ok(outcome("", 120)), Instant::now());

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(matches!(
        events(&actions).last(),
        Some(SessionEvent::Error { error: VerificationError::MalformedResponse { .. }, retryable: false })
    ));
}

#[test]
fn test_initiate_failure_returns_to_idle() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    let ticket = initiate_ticket(&machine.submit_phone_number("10123456789").unwrap());
    let error = VerificationError::TransportError { message: "offline".into() };

    let actions = machine.initiate_completed(ticket, Err(error.clone()), Instant::now());

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.session().is_none());
    assert_eq!(
        events(&actions),
        vec![
            SessionEvent::StatusChanged { status: SessionStatus::Idle },
            SessionEvent::Error { error, retryable: false },
        ]
    );
}

#[test]
fn test_empty_code_is_rejected_without_state_change() {
    let (mut machine, _) = awaiting(120, Instant::now());
    assert_eq!(machine.submit_code(""), Err(VerificationError::EmptyCode));
    assert_eq!(machine.status(), SessionStatus::AwaitingCode);
    assert!(machine.pending_ticket().is_none());
}

#[test]
fn test_code_outside_session_is_rejected() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    assert_eq!(
        machine.submit_code("123456"),
        Err(VerificationError::SessionNotActive { status: SessionStatus::Idle })
    );

    machine.submit_phone_number("10123456789").unwrap();
    assert_eq!(
        machine.submit_code("123456"),
        Err(VerificationError::SessionNotActive { status: SessionStatus::Initiating })
    );
}

#[test]
fn test_finalize_success_verifies_session() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let actions = machine.submit_code("123456").unwrap();
    assert_eq!(machine.status(), SessionStatus::Verifying);
    assert!(actions.iter().any(|action| matches!(
        action,
        MachineAction::Finalize { request_id, code, .. } if request_id == "abcdefg" && code == "123456"
    )));

    let actions = machine.finalize_completed(finalize_ticket(&actions), Ok(verified()));

    assert_eq!(machine.status(), SessionStatus::Verified);
    assert_eq!(actions[0], MachineAction::StopCountdown);
    assert_eq!(
        events(&actions).last(),
        Some(&SessionEvent::Success { message: "Verified".into() })
    );
}

#[test]
fn test_code_mismatch_is_retryable_in_place() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let ticket = finalize_ticket(&machine.submit_code("000000").unwrap());
    let mismatch = app_error(1008, "Verification code mismatch");

    let actions = machine.finalize_completed(ticket, Err(mismatch.clone()));

    assert_eq!(machine.status(), SessionStatus::AwaitingCode);
    assert!(!actions.contains(&MachineAction::StopCountdown));
    assert_eq!(
        events(&actions),
        vec![
            SessionEvent::StatusChanged { status: SessionStatus::AwaitingCode },
            SessionEvent::Error { error: mismatch, retryable: true },
        ]
    );
    assert!(machine.submit_code("123456").is_ok());
}

#[test]
fn test_other_application_error_fails_session() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let ticket = finalize_ticket(&machine.submit_code("123456").unwrap());

    let actions = machine.finalize_completed(ticket, Err(app_error(1007, "Request not found")));

    assert_eq!(machine.status(), SessionStatus::Failed);
    assert!(actions.contains(&MachineAction::StopCountdown));
    assert_eq!(
        machine.submit_code("123456"),
        Err(VerificationError::SessionNotActive { status: SessionStatus::Failed })
    );
}

#[test]
fn test_transport_error_during_finalize_returns_to_awaiting_code() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let ticket = finalize_ticket(&machine.submit_code("123456").unwrap());

    machine.finalize_completed(ticket, Err(VerificationError::TransportError { message: "reset".into() }));
    assert_eq!(machine.status(), SessionStatus::AwaitingCode);

    let ticket = finalize_ticket(&machine.submit_code("123456").unwrap());
    machine.finalize_completed(ticket, Err(VerificationError::MalformedResponse { message: "bad".into() }));
    assert_eq!(machine.status(), SessionStatus::AwaitingCode);
}

#[test]
fn test_new_code_supersedes_pending_finalize() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let first = finalize_ticket(&machine.submit_code("111111").unwrap());

    let actions = machine.submit_code("123456").unwrap();
    assert_eq!(actions[0], MachineAction::CancelInFlight);
    let second = finalize_ticket(&actions);

    assert!(machine.finalize_completed(first, Ok(verified())).is_empty());
    assert_eq!(machine.status(), SessionStatus::Verifying);

    machine.finalize_completed(second, Ok(verified()));
    assert_eq!(machine.status(), SessionStatus::Verified);
}

#[test]
fn test_countdown_expires_exactly_once() {
    let now = Instant::now();
    let (mut machine, session_id) = awaiting(2, now);

    let first = machine.tick(session_id, now);
    assert_eq!(events(&first), vec![SessionEvent::Tick { remaining_seconds: 1 }]);

    let second = machine.tick(session_id, now);
    assert_eq!(machine.status(), SessionStatus::Expired);
    assert!(second.contains(&MachineAction::StopCountdown));
    assert_eq!(
        events(&second),
        vec![
            SessionEvent::Tick { remaining_seconds: 0 },
            SessionEvent::StatusChanged { status: SessionStatus::Expired },
            SessionEvent::Timeout,
        ]
    );

    assert!(machine.tick(session_id, now + COOLDOWN).is_empty());
    assert_eq!(machine.submit_code("123456"), Err(VerificationError::SessionExpired));
    assert_eq!(machine.resend(now + COOLDOWN), Err(VerificationError::SessionExpired));
}

#[test]
fn test_countdown_expires_while_verifying() {
    let now = Instant::now();
    let (mut machine, session_id) = awaiting(2, now);
    let ticket = finalize_ticket(&machine.submit_code("123456").unwrap());

    let first = machine.tick(session_id, now);
    assert_eq!(events(&first), vec![SessionEvent::Tick { remaining_seconds: 1 }]);
    assert_eq!(machine.status(), SessionStatus::Verifying);

    let second = machine.tick(session_id, now);
    assert_eq!(machine.status(), SessionStatus::Expired);
    assert_eq!(second[1], MachineAction::CancelInFlight);
    assert!(second.contains(&MachineAction::StopCountdown));
    assert_eq!(
        events(&second),
        vec![
            SessionEvent::Tick { remaining_seconds: 0 },
            SessionEvent::StatusChanged { status: SessionStatus::Expired },
            SessionEvent::Timeout,
        ]
    );

    // The aborted finalize can no longer change the outcome
    assert!(machine.finalize_completed(ticket, Ok(verified())).is_empty());
    assert_eq!(machine.status(), SessionStatus::Expired);
}

#[test]
fn test_countdown_keeps_running_during_resend() {
    let now = Instant::now();
    let (mut machine, session_id) = awaiting(120, now);
    let ticket = initiate_ticket(&machine.resend(now + COOLDOWN).unwrap());

    let actions = machine.tick(session_id, now + COOLDOWN);
    assert!(events(&actions).contains(&SessionEvent::Tick { remaining_seconds: 119 }));
    assert_eq!(machine.status(), SessionStatus::Initiating);

    machine.initiate_completed(ticket, Ok(outcome("second", 90)), now + COOLDOWN);
    assert_eq!(machine.session().unwrap().remaining_seconds, 90);
}

#[test]
fn test_countdown_does_not_move_before_first_request() {
    let now = Instant::now();
    let mut machine = VerificationMachine::new(COOLDOWN);
    machine.submit_phone_number("10123456789").unwrap();
    let session_id = machine.session().unwrap().id;

    assert!(machine.tick(session_id, now).is_empty());
    assert_eq!(machine.status(), SessionStatus::Initiating);
}

#[test]
fn test_stale_tick_from_replaced_session_is_ignored() {
    let now = Instant::now();
    let (mut machine, old_session) = awaiting(120, now);
    machine.cancel();
    let ticket = initiate_ticket(&machine.submit_phone_number("10123456780").unwrap());
    machine.initiate_completed(ticket, Ok(outcome("hijklmn", 120)), now);

    assert!(machine.tick(old_session, now).is_empty());
    assert_eq!(machine.session().unwrap().remaining_seconds, 120);
}

#[test]
fn test_stale_initiate_after_cancel_is_ignored() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    let ticket = initiate_ticket(&machine.submit_phone_number("10123456789").unwrap());

    let actions = machine.cancel();
    assert!(actions.contains(&MachineAction::CancelInFlight));
    assert_eq!(machine.status(), SessionStatus::Idle);

    assert!(machine
        .initiate_completed(ticket, Ok(outcome("abcdefg", 120)), Instant::now())
        .is_empty());
    assert_eq!(machine.status(), SessionStatus::Idle);
}

#[test]
fn test_resend_respects_cooldown() {
    let now = Instant::now();
    let (mut machine, session_id) = awaiting(120, now);

    assert_eq!(
        machine.resend(now + Duration::from_millis(500)),
        Err(VerificationError::ResendCooldown { remaining_seconds: 60 })
    );
    assert_eq!(
        machine.resend(now + Duration::from_secs(45)),
        Err(VerificationError::ResendCooldown { remaining_seconds: 15 })
    );

    let actions = machine.tick(session_id, now + COOLDOWN);
    assert_eq!(events(&actions)[0], SessionEvent::ResendAvailable);
    // Announced only once
    assert!(!events(&machine.tick(session_id, now + COOLDOWN)).contains(&SessionEvent::ResendAvailable));

    let later = now + COOLDOWN;
    let actions = machine.resend(later).unwrap();
    assert_eq!(machine.status(), SessionStatus::Initiating);
    assert!(events(&actions).contains(&SessionEvent::ResendLocked { seconds: 60 }));

    let actions = machine.initiate_completed(initiate_ticket(&actions), Ok(outcome("second", 90)), later);
    let session = machine.session().unwrap();
    assert_eq!(session.request_id, "second");
    assert_eq!(session.remaining_seconds, 90);
    assert!(actions.contains(&MachineAction::StartCountdown { session_id }));
    assert_eq!(
        machine.resend(later + Duration::from_secs(1)),
        Err(VerificationError::ResendCooldown { remaining_seconds: 59 })
    );
}

#[test]
fn test_failed_resend_keeps_previous_request() {
    let now = Instant::now();
    let (mut machine, _) = awaiting(120, now);
    let ticket = initiate_ticket(&machine.resend(now + COOLDOWN).unwrap());

    let actions = machine.initiate_completed(
        ticket,
        Err(VerificationError::TokenServiceUnreachable { message: "offline".into() }),
        now + COOLDOWN,
    );

    assert_eq!(machine.status(), SessionStatus::AwaitingCode);
    assert_eq!(machine.session().unwrap().request_id, "abcdefg");
    assert!(matches!(
        events(&actions).last(),
        Some(SessionEvent::Error { retryable: true, .. })
    ));
}

#[test]
fn test_resend_outside_awaiting_code_is_rejected() {
    let mut machine = VerificationMachine::new(COOLDOWN);
    assert_eq!(
        machine.resend(Instant::now()),
        Err(VerificationError::SessionNotActive { status: SessionStatus::Idle })
    );
}

#[test]
fn test_cancel_clears_session() {
    let (mut machine, _) = awaiting(120, Instant::now());
    let actions = machine.cancel();

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert_eq!(actions[0], MachineAction::StopCountdown);
    assert_eq!(
        events(&actions),
        vec![SessionEvent::StatusChanged { status: SessionStatus::Idle }]
    );
    assert!(machine.cancel().is_empty());
}

#[test]
fn test_new_session_after_terminal_state() {
    let now = Instant::now();
    let (mut machine, session_id) = awaiting(1, now);
    machine.tick(session_id, now);
    assert_eq!(machine.status(), SessionStatus::Expired);

    machine.submit_phone_number("10123456789").unwrap();
    let session = machine.session().unwrap();
    assert_eq!(session.status, SessionStatus::Initiating);
    assert_ne!(session.id, session_id);
}
