//! Verification-gated migration orchestration.
//!
//! [`Orchestrator`] is the single coordinator of the whole system: it
//! owns both per-endpoint [`ConnectionState`](dbshift_core::ConnectionState)s
//! and the one [`MigrationJob`], enforces the gating invariant (migration
//! starts only with both endpoints verified and no job running), and
//! serializes every state mutation through one lock. Verification probes
//! and migration units run on spawned tasks; their results re-enter
//! orchestrator state only through that lock, guarded against stale
//! responses by the per-endpoint request epoch.

pub mod error;
pub mod job;
pub mod orchestrator;

pub use error::OrchestratorError;
pub use job::{JobState, MigrationJob};
pub use orchestrator::{ConnectionSnapshot, Orchestrator, OrchestratorConfig};
