//! Business services driving phone verification.

pub mod deep_link;
pub mod verification;

// Re-export commonly used types
pub use deep_link::DeepLinkResolver;
pub use verification::{
    DeviceInfoTrait, MachineAction, SessionEvent, SessionHandle, SessionSnapshot, Ticket,
    TokenProviderTrait, VerificationMachine, VerificationService, VerificationServiceConfig,
    VerificationTransportTrait,
};
