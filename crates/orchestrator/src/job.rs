//! Migration job read model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of the (at most one) migration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Read-only projection of the current migration job.
///
/// The orchestrator owns exactly one of these; `Idle` is the baseline
/// before the first run and a terminal `Succeeded`/`Failed` job is
/// replaced wholesale when a new migration is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationJob {
    /// Identifier of the accepted run; `None` while `Idle`.
    pub id: Option<Uuid>,
    pub state: JobState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Units committed to the destination so far. Monotonic within a
    /// run; preserved on failure and cancellation.
    pub items_processed: u64,
    /// Operator-readable failure description, set only in `Failed`.
    pub error: Option<String>,
}

impl MigrationJob {
    /// Baseline before any migration has been requested.
    pub fn idle() -> Self {
        Self {
            id: None,
            state: JobState::Idle,
            started_at: None,
            finished_at: None,
            items_processed: 0,
            error: None,
        }
    }

    /// A freshly accepted, running job.
    pub fn start() -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            state: JobState::Running,
            started_at: Some(Utc::now()),
            finished_at: None,
            items_processed: 0,
            error: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// Mark the running job succeeded.
    pub fn complete(&mut self, items_processed: u64) {
        self.state = JobState::Succeeded;
        self.items_processed = items_processed;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the running job failed, preserving partial progress.
    pub fn fail(&mut self, items_processed: u64, error: String) {
        self.state = JobState::Failed;
        self.items_processed = items_processed;
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }
}

impl Default for MigrationJob {
    fn default() -> Self {
        Self::idle()
    }
}
