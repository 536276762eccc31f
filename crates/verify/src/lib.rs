//! Endpoint verification seam.
//!
//! The orchestrator verifies each endpoint's credentials through the
//! [`EndpointVerifier`] trait before permitting a migration. This crate
//! defines the trait, the [`VerificationError`] taxonomy, and
//! [`HttpVerifier`], a production driver that performs a real
//! authenticated HTTP probe against the endpoint.

pub mod config;
pub mod http;
pub mod verifier;

pub use config::VerifierConfig;
pub use http::HttpVerifier;
pub use verifier::{EndpointVerifier, VerificationError};
