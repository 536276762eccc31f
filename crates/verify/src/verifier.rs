//! The [`EndpointVerifier`] trait and its error taxonomy.

use async_trait::async_trait;
use dbshift_core::{Credentials, VerifiedInfo};

/// Why an authentication probe failed.
///
/// The rendered messages are operator-facing: they appear verbatim in
/// error-level activity-log entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The endpoint answered and rejected the credentials.
    #[error("authentication rejected by the endpoint")]
    AuthRejected,

    /// The endpoint could not be reached at all (DNS, connect, TLS).
    #[error("endpoint unreachable")]
    Unreachable,

    /// The probe did not complete within its bounded timeout.
    #[error("verification timed out")]
    Timeout,

    /// Anything else.
    #[error("verification failed: {0}")]
    Unknown(String),
}

/// Authentication/authorization probe for one endpoint.
///
/// Implementations are pure per call: exactly one outbound probe, no
/// internal retries (retry policy belongs to the orchestrator), no side
/// effects beyond the probe itself. The call may suspend on network I/O
/// but must resolve within a bounded time, returning
/// [`VerificationError::Timeout`] on expiry.
#[async_trait]
pub trait EndpointVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<VerifiedInfo, VerificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_operator_readable() {
        assert_eq!(
            VerificationError::AuthRejected.to_string(),
            "authentication rejected by the endpoint"
        );
        assert_eq!(
            VerificationError::Unreachable.to_string(),
            "endpoint unreachable"
        );
        assert_eq!(
            VerificationError::Timeout.to_string(),
            "verification timed out"
        );
        assert_eq!(
            VerificationError::Unknown("boom".into()).to_string(),
            "verification failed: boom"
        );
    }
}
