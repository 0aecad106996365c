//! Shared utilities and common types for the AppVerify client
//!
//! This crate provides functionality used across all workspace members:
//! - Configuration types (environment, API endpoints, deep links, logging)
//! - Phone number utilities (sanitisation, masking)
//! - The bundled country-code catalog

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    ApiConfig, ApiProvider, AppConfig, DeepLinkConfig, Environment, LogFormat, LoggingConfig,
    VerificationConfig,
};
pub use types::{CountryCatalog, CountryCodeEntry};
pub use utils::phone;
