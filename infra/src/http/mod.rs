//! HTTP implementations of the token provider and verification transport
//!
//! ## Endpoints
//!
//! - **Token**: `GET <token_url>/v1/mobile/verification/token/<customer id>`, raw ASCII body
//! - **Initiate**: `POST <base>/sms`, form encoded
//! - **Finalize**: `POST <base>/code`, form encoded

mod client;
pub mod dto;
mod token_provider;
mod transport;

pub use client::{build_client, endpoint_base};
pub use token_provider::{decode_token, HttpTokenProvider, TOKEN_PATH};
pub use transport::{HttpVerificationTransport, FINALIZE_PATH, INITIATE_PATH};
