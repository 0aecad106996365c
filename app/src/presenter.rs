//! Rendering of session events

use std::io::Write;

use av_core::{SessionEvent, SessionStatus};

/// Receives everything the user should see about a verification session.
///
/// The terminal front end implements this with [`TerminalView`]; other
/// front ends can plug in their own rendering.
pub trait VerificationView {
    fn on_status(&mut self, status: SessionStatus);

    fn on_code_sent(&mut self, timeout_seconds: u32);

    fn on_tick(&mut self, remaining_seconds: u32);

    fn on_resend_locked(&mut self, seconds: u64);

    fn on_resend_available(&mut self);

    fn on_success(&mut self, message: &str);

    /// `retryable` is true when the session still accepts a code
    fn on_error(&mut self, message: &str, retryable: bool);

    fn on_timeout(&mut self);

    /// Free-form output such as help text or command errors
    fn show(&mut self, text: &str);
}

/// Dispatch one session event to the view
pub fn present<V: VerificationView + ?Sized>(view: &mut V, event: &SessionEvent) {
    match event {
        SessionEvent::StatusChanged { status } => view.on_status(*status),
        SessionEvent::Tick { remaining_seconds } => view.on_tick(*remaining_seconds),
        SessionEvent::CodeSent { timeout_seconds } => view.on_code_sent(*timeout_seconds),
        SessionEvent::ResendLocked { seconds } => view.on_resend_locked(*seconds),
        SessionEvent::ResendAvailable => view.on_resend_available(),
        SessionEvent::Success { message } => view.on_success(message),
        SessionEvent::Error { error, retryable } => view.on_error(&error.to_string(), *retryable),
        SessionEvent::Timeout => view.on_timeout(),
    }
}

/// Line-oriented view writing to any [`Write`] sink
pub struct TerminalView<W: Write> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(error) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %error, event = "terminal_write_failed", "Failed to write output");
        }
    }
}

impl<W: Write> VerificationView for TerminalView<W> {
    fn on_status(&mut self, status: SessionStatus) {
        match status {
            SessionStatus::Initiating => self.line("Sending verification code..."),
            SessionStatus::Verifying => self.line("Checking code..."),
            // Other states are covered by their own events
            _ => tracing::debug!(status = %status, event = "status_rendered", "Status changed"),
        }
    }

    fn on_code_sent(&mut self, timeout_seconds: u32) {
        self.line(&format!(
            "Code sent. Enter it with 'code <code>' or open the link within {timeout_seconds}s."
        ));
    }

    fn on_tick(&mut self, remaining_seconds: u32) {
        // Announce every half minute, then every second for the last ten
        if remaining_seconds > 0 && (remaining_seconds <= 10 || remaining_seconds % 30 == 0) {
            self.line(&format!("{remaining_seconds}s remaining"));
        }
    }

    fn on_resend_locked(&mut self, seconds: u64) {
        self.line(&format!("Resend available in {seconds}s"));
    }

    fn on_resend_available(&mut self) {
        self.line("You can now request a new code with 'resend'");
    }

    fn on_success(&mut self, message: &str) {
        self.line(&format!("Verified: {message}"));
    }

    fn on_error(&mut self, message: &str, retryable: bool) {
        if retryable {
            self.line(&format!("Error: {message}. Try again."));
        } else {
            self.line(&format!("Error: {message}"));
        }
    }

    fn on_timeout(&mut self) {
        self.line("Verification timed out, please retry verification");
    }

    fn show(&mut self, text: &str) {
        self.line(text);
    }
}
