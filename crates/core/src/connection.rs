//! Per-endpoint verification state machine.
//!
//! Each endpoint owns one [`ConnectionState`] tracking its credentials,
//! verification status, and a monotonically increasing `request_epoch`.
//! The epoch is captured when a verification is dispatched and checked
//! when its response arrives: a response from a superseded request is
//! discarded instead of clobbering newer state.
//!
//! Transitions:
//!
//! ```text
//! Unverified -> Verifying -> { Verified | Failed }
//! Verified   -> Unverified   (credential edit)
//! Failed     -> Unverified   (credential edit)
//! Verified   -> Verifying    (re-request, same credentials, new epoch)
//! Failed     -> Verifying    (re-request, same credentials, new epoch)
//! ```
//!
//! The machine is long-lived and re-enterable; it has no terminal state.

use serde::Serialize;

use crate::types::{ConnectionRole, CredentialField, Credentials, EndpointSnapshot, VerifiedInfo};

// ---------------------------------------------------------------------------
// VerificationStatus
// ---------------------------------------------------------------------------

/// Verification status of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "reason")]
pub enum VerificationStatus {
    /// Credentials have never been verified, or were edited since the
    /// last verification.
    Unverified,
    /// A verification probe is in flight. Exclusive per role.
    Verifying,
    /// The most recent probe authenticated successfully.
    Verified,
    /// The most recent probe failed; the reason is operator-readable.
    Failed(String),
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self, VerificationStatus::Verifying)
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// State for one endpoint: credentials, status, and the request epoch
/// used to discard stale verification responses.
///
/// Owned exclusively by the orchestrator; all methods are synchronous
/// and non-blocking.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    role: ConnectionRole,
    credentials: Credentials,
    status: VerificationStatus,
    request_epoch: u64,
}

impl ConnectionState {
    pub fn new(role: ConnectionRole) -> Self {
        Self {
            role,
            credentials: Credentials::default(),
            status: VerificationStatus::Unverified,
            request_epoch: 0,
        }
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn status(&self) -> &VerificationStatus {
        &self.status
    }

    pub fn request_epoch(&self) -> u64 {
        self.request_epoch
    }

    /// Immutable capture of this endpoint for a migration job.
    pub fn snapshot(&self) -> EndpointSnapshot {
        EndpointSnapshot {
            role: self.role,
            credentials: self.credentials.clone(),
        }
    }

    /// Replace one credential field.
    ///
    /// Any status other than `Unverified` falls back to `Unverified`:
    /// a stale `Verified` or `Failed` must never survive an edit, and an
    /// edit during `Verifying` orphans the in-flight probe (its response
    /// is then discarded by [`ConnectionState::apply_outcome`]). The
    /// epoch is untouched; it only advances on verification requests.
    pub fn update_field(&mut self, field: CredentialField, value: impl Into<String>) {
        self.credentials = self.credentials.set(field, value);
        if self.status != VerificationStatus::Unverified {
            self.status = VerificationStatus::Unverified;
        }
    }

    /// Transition to `Verifying` and return the new request epoch.
    ///
    /// Callable from `Unverified`, `Verified`, or `Failed` (re-requesting
    /// keeps the existing credentials). The caller must not invoke this
    /// while already `Verifying`; the orchestrator enforces that.
    pub fn begin_verification(&mut self) -> u64 {
        debug_assert!(!self.status.is_verifying());
        self.request_epoch += 1;
        self.status = VerificationStatus::Verifying;
        self.request_epoch
    }

    /// Apply a verification response captured at `epoch`.
    ///
    /// The response is applied only when the machine is still `Verifying`
    /// and the epoch matches the current one; otherwise it is from a
    /// superseded request (or the credentials were edited meanwhile) and
    /// is dropped. Returns whether the response was applied.
    pub fn apply_outcome(
        &mut self,
        epoch: u64,
        outcome: Result<VerifiedInfo, impl std::fmt::Display>,
    ) -> bool {
        if !self.status.is_verifying() || epoch != self.request_epoch {
            return false;
        }
        self.status = match outcome {
            Ok(VerifiedInfo) => VerificationStatus::Verified,
            Err(reason) => VerificationStatus::Failed(reason.to_string()),
        };
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn verified_state() -> ConnectionState {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        state.update_field(CredentialField::ProjectId, "p1");
        state.update_field(CredentialField::Password, "pw");
        state.update_field(CredentialField::ServiceRole, "sr");
        let epoch = state.begin_verification();
        assert!(state.apply_outcome(epoch, Ok::<_, String>(VerifiedInfo)));
        state
    }

    #[test]
    fn new_state_is_unverified_at_epoch_zero() {
        let state = ConnectionState::new(ConnectionRole::Destination);
        assert_eq!(*state.status(), VerificationStatus::Unverified);
        assert_eq!(state.request_epoch(), 0);
        assert!(!state.credentials().is_complete());
    }

    #[test]
    fn begin_verification_increments_epoch() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        let first = state.begin_verification();
        assert_eq!(first, 1);
        assert!(state.status().is_verifying());

        state.apply_outcome(first, Err::<VerifiedInfo, _>("no route"));
        let second = state.begin_verification();
        assert_eq!(second, 2);
    }

    #[test]
    fn successful_outcome_moves_to_verified() {
        let state = verified_state();
        assert!(state.status().is_verified());
    }

    #[test]
    fn failed_outcome_keeps_reason() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        let epoch = state.begin_verification();
        assert!(state.apply_outcome(epoch, Err::<VerifiedInfo, _>("connection refused")));
        assert_eq!(
            *state.status(),
            VerificationStatus::Failed("connection refused".into())
        );
    }

    #[test]
    fn edit_from_verified_falls_back_to_unverified() {
        let mut state = verified_state();
        state.update_field(CredentialField::Password, "changed");
        assert_eq!(*state.status(), VerificationStatus::Unverified);
    }

    #[test]
    fn edit_from_failed_falls_back_to_unverified() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        let epoch = state.begin_verification();
        state.apply_outcome(epoch, Err::<VerifiedInfo, _>("nope"));

        state.update_field(CredentialField::ProjectId, "other");
        assert_eq!(*state.status(), VerificationStatus::Unverified);
    }

    #[test]
    fn edit_does_not_advance_epoch() {
        let mut state = verified_state();
        let epoch = state.request_epoch();
        state.update_field(CredentialField::Password, "changed");
        assert_eq!(state.request_epoch(), epoch);
    }

    #[test]
    fn stale_epoch_response_is_discarded() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        let stale = state.begin_verification();

        // Supersede: edit (back to Unverified), then request again.
        state.update_field(CredentialField::Password, "pw2");
        let current = state.begin_verification();
        assert!(stale < current);

        // The slow first response arrives late and must not apply.
        assert!(!state.apply_outcome(stale, Ok::<_, String>(VerifiedInfo)));
        assert!(state.status().is_verifying());

        // The live response still applies.
        assert!(state.apply_outcome(current, Ok::<_, String>(VerifiedInfo)));
        assert!(state.status().is_verified());
    }

    #[test]
    fn response_after_edit_is_discarded_even_with_matching_epoch() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        let epoch = state.begin_verification();

        // The operator edits a field while the probe is in flight.
        state.update_field(CredentialField::Password, "pw2");
        assert_eq!(*state.status(), VerificationStatus::Unverified);

        // The probe saw the pre-edit credentials; its verdict is void.
        assert!(!state.apply_outcome(epoch, Ok::<_, String>(VerifiedInfo)));
        assert_eq!(*state.status(), VerificationStatus::Unverified);
    }

    #[test]
    fn re_request_from_failed_keeps_credentials() {
        let mut state = ConnectionState::new(ConnectionRole::Source);
        state.update_field(CredentialField::ProjectId, "p1");
        state.update_field(CredentialField::Password, "pw");
        state.update_field(CredentialField::ServiceRole, "sr");
        let epoch = state.begin_verification();
        state.apply_outcome(epoch, Err::<VerifiedInfo, _>("timeout"));

        let creds_before = state.credentials().clone();
        state.begin_verification();
        assert_eq!(*state.credentials(), creds_before);
        assert!(state.status().is_verifying());
    }

    #[test]
    fn snapshot_is_insulated_from_later_edits() {
        let mut state = verified_state();
        let snapshot = state.snapshot();

        state.update_field(CredentialField::Password, "rotated");

        assert_eq!(snapshot.credentials.password.expose(), "pw");
        assert_eq!(state.credentials().password.expose(), "rotated");
    }
}
