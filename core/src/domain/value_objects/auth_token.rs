//! Customer credentials and the bearer token they buy.

use std::fmt;

use uuid::Uuid;

use crate::errors::{VerificationError, VerificationResult};

/// Customer identifier issued by the verification provider.
///
/// Must be a well-formed UUID in hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Validate a raw identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(CustomerId)` - The identifier is a UUID
    /// * `Err(VerificationError::InvalidCredential)` - Anything else, including the
    ///   placeholder shipped in default configuration
    pub fn parse(raw: &str) -> VerificationResult<Self> {
        let trimmed = raw.trim();
        // Only the hyphenated 36-char form is accepted, like the token endpoint path expects
        if trimmed.len() != 36 {
            return Err(VerificationError::InvalidCredential);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| VerificationError::InvalidCredential)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Single-use bearer token sent as `jwt` on initiate
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
}

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .finish()
    }
}
