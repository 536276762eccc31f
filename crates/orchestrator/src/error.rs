//! Caller-facing orchestrator errors.
//!
//! These are user-input and usage errors, reported synchronously to the
//! caller and never written to the activity log; the log records system
//! outcomes, not rejected requests.

use dbshift_core::ConnectionRole;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    /// At least one credential field for the role is empty. No probe is
    /// dispatched and the request epoch does not advance.
    #[error("credentials for the {0} database are incomplete")]
    IncompleteCredentials(ConnectionRole),

    /// A verification probe for the role is already in flight.
    #[error("a verification for the {0} database is already in flight")]
    VerificationInFlight(ConnectionRole),

    /// Migration was requested while the gate is closed: at least one
    /// endpoint is not verified, or a job is already running.
    #[error("migration requires both databases verified and no migration in flight")]
    NotReady,
}
