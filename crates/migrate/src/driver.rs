//! The [`MigrationDriver`] seam a concrete data-store driver implements.

use async_trait::async_trait;
use dbshift_core::EndpointSnapshot;

/// The smallest piece of work the executor commits and retries
/// independently. Granularity is driver-defined: a table, a batch of
/// rows, a storage bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationUnit {
    /// Operator-facing name, e.g. `"table public.users"`.
    pub label: String,
}

impl MigrationUnit {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Failure of a single driver call (planning or applying one unit).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct UnitError(pub String);

/// Bulk-transfer driver for one pair of endpoints.
///
/// Implementations perform the actual data movement and nothing else:
/// retry, backoff, timeout, and cancellation are owned by the
/// [`MigrationExecutor`](crate::executor::MigrationExecutor). `apply`
/// must commit the unit to the destination before returning `Ok`; the
/// executor treats a returned error as "not committed" and may call
/// `apply` again for the same unit, so drivers that cannot make unit
/// application idempotent will duplicate data on retry after a partial
/// write.
#[async_trait]
pub trait MigrationDriver: Send + Sync {
    /// Plan the ordered list of units for this endpoint pair.
    async fn plan(
        &self,
        source: &EndpointSnapshot,
        dest: &EndpointSnapshot,
    ) -> Result<Vec<MigrationUnit>, UnitError>;

    /// Commit one unit to the destination.
    async fn apply(
        &self,
        source: &EndpointSnapshot,
        dest: &EndpointSnapshot,
        unit: &MigrationUnit,
    ) -> Result<(), UnitError>;
}
