//! Mock verification backend
//!
//! An in-process token provider and transport for development without a
//! server. Sent codes are printed to the console instead of delivered by SMS.

mod token_provider;
mod transport;

pub use token_provider::MockTokenProvider;
pub use transport::{
    MockVerificationTransport, DEFAULT_MOCK_CODE, DEFAULT_MOCK_TIMEOUT_SECS, REQUEST_NOT_FOUND,
};
