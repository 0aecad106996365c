//! Domain entities representing core business objects.

pub mod session;

// Re-export commonly used types
pub use session::{SessionId, SessionStatus, VerificationSession};
