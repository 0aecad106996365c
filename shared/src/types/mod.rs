//! Type definitions module
//!
//! - `country` - bundled country dialing codes

pub mod country;

pub use country::{CountryCatalog, CountryCodeEntry};
