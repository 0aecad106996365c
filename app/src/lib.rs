//! # AppVerify terminal front end
//!
//! Presentation adapter for the verification core. It reads commands from a
//! line-based input, feeds phone numbers, codes and deep links into the
//! session, and renders the session's events.

pub mod commands;
pub mod logging;
pub mod presenter;
pub mod runner;

pub use commands::{Command, CommandError};
pub use presenter::{present, TerminalView, VerificationView};
pub use runner::{Flow, Runner};
