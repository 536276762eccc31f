//! Endpoint roles and credential value types.

use serde::Serialize;

use crate::secret::Secret;

// ---------------------------------------------------------------------------
// ConnectionRole
// ---------------------------------------------------------------------------

/// Which side of the migration an endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Source,
    Destination,
}

impl ConnectionRole {
    /// Lowercase name used in operator-facing log messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionRole::Source => "source",
            ConnectionRole::Destination => "destination",
        }
    }
}

impl std::fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// One editable field of an endpoint's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    ProjectId,
    Password,
    ServiceRole,
}

/// Credentials for one endpoint.
///
/// Immutable value type: [`Credentials::set`] returns a new value rather
/// than mutating in place, so a snapshot captured by a running migration
/// can never observe a later edit. Secrets are held in [`Secret`] wrappers
/// and never appear in `Debug` output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub project_id: String,
    pub password: Secret,
    pub service_role: Secret,
}

impl Credentials {
    pub fn new(
        project_id: impl Into<String>,
        password: impl Into<Secret>,
        service_role: impl Into<Secret>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            password: password.into(),
            service_role: service_role.into(),
        }
    }

    /// Return a copy with one field replaced.
    pub fn set(&self, field: CredentialField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            CredentialField::ProjectId => next.project_id = value,
            CredentialField::Password => next.password = Secret::new(value),
            CredentialField::ServiceRole => next.service_role = Secret::new(value),
        }
        next
    }

    /// True when every field is non-empty.
    ///
    /// A verification request is rejected locally while this is false;
    /// no network probe is dispatched for incomplete credentials.
    pub fn is_complete(&self) -> bool {
        !self.project_id.is_empty() && !self.password.is_empty() && !self.service_role.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Verification / snapshot markers
// ---------------------------------------------------------------------------

/// Opaque marker returned by a successful endpoint verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifiedInfo;

/// Immutable capture of one endpoint at migration start.
///
/// A running job holds two of these; concurrent edits to the live
/// connection state do not affect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSnapshot {
    pub role: ConnectionRole,
    pub credentials: Credentials,
}
