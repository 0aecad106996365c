//! # AppVerify Core
//!
//! Core domain and session logic for the AppVerify phone verification client.
//! This crate contains the session entity and value objects, the error
//! taxonomy, the verification state machine with its actor, the deep-link
//! resolver, and the traits infrastructure implements for token issuance,
//! transport and device details.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
