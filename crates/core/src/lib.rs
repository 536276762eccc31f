//! Pure domain types for the dbshift migration orchestrator.
//!
//! This crate holds everything that is synchronous and I/O-free:
//!
//! - [`Secret`] — redacting wrapper for credential secrets.
//! - [`Credentials`], [`ConnectionRole`], [`CredentialField`] — endpoint
//!   credential value types.
//! - [`ConnectionState`] — the per-endpoint verification state machine
//!   with its stale-response epoch guard.
//! - [`EndpointSnapshot`] — the immutable capture a migration job runs
//!   against.

pub mod connection;
pub mod secret;
pub mod types;

pub use connection::{ConnectionState, VerificationStatus};
pub use secret::Secret;
pub use types::{ConnectionRole, CredentialField, Credentials, EndpointSnapshot, VerifiedInfo};
