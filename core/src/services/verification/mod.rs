//! Phone verification session handling
//!
//! This module provides the verification workflow:
//! - A pure state machine owning the single active session
//! - An actor that runs the machine on one task and drives the network and countdown
//! - Traits for the token provider, transport and device details it depends on

mod config;
mod machine;
mod service;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use config::VerificationServiceConfig;
pub use machine::VerificationMachine;
pub use service::{SessionHandle, VerificationService};
pub use traits::{DeviceInfoTrait, TokenProviderTrait, VerificationTransportTrait};
pub use types::{MachineAction, SessionEvent, SessionSnapshot, Ticket};
