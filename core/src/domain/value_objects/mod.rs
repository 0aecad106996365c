//! Value objects exchanged between the session logic and its collaborators.

pub mod auth_token;
pub mod deep_link_request;
pub mod device_metadata;
pub mod outcomes;

// Re-export commonly used types
pub use auth_token::{AuthToken, CustomerId};
pub use deep_link_request::DeepLinkRequest;
pub use device_metadata::{DeviceMetadata, REQUEST_DATETIME_FORMAT};
pub use outcomes::{FinalizeOutcome, InitiateOutcome};
