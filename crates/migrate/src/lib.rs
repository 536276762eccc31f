//! Supervised, resumable migration execution.
//!
//! A concrete data-store driver implements [`MigrationDriver`]: it plans
//! an ordered list of [`MigrationUnit`]s and commits them one at a time.
//! [`MigrationExecutor`] owns everything around that seam: per-unit
//! timeout, bounded retry with exponential backoff, cooperative
//! cancellation at unit boundaries, and cumulative progress reporting.
//!
//! Migration is not transactional across units: units already committed
//! to the destination are never rolled back, and every failure carries
//! the count of committed units so the operator can reason about a
//! re-run.

pub mod driver;
pub mod executor;
pub mod retry;

pub use driver::{MigrationDriver, MigrationUnit, UnitError};
pub use executor::{MigrationError, MigrationExecutor, MigrationSummary};
pub use retry::{next_delay, RetryConfig};
