//! The migration executor: a supervised unit-by-unit transfer loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dbshift_core::EndpointSnapshot;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::driver::{MigrationDriver, MigrationUnit, UnitError};
use crate::retry::{next_delay, RetryConfig};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Terminal summary of a successful migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Number of units committed to the destination.
    pub items_processed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Why a migration ended without completing.
///
/// Every variant preserves the count of units already committed to the
/// destination; those are never rolled back. The rendered messages are
/// operator-facing and state that explicitly, since re-running after a
/// fix may duplicate committed units unless the driver is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// One unit exhausted its retry budget.
    #[error(
        "{unit} failed after {attempts} attempts ({cause}); \
         {items_processed} earlier unit(s) were already committed to the \
         destination and were not rolled back"
    )]
    UnitFailed {
        unit: String,
        attempts: u32,
        items_processed: u64,
        cause: UnitError,
    },

    /// The orchestrator requested cancellation at a unit boundary.
    #[error(
        "cancelled by operator; {items_processed} unit(s) were already \
         committed to the destination and were not rolled back"
    )]
    Cancelled { items_processed: u64 },

    /// Planning or another non-unit step failed.
    #[error("{0}")]
    Unknown(String),
}

impl MigrationError {
    /// Units committed before the failure.
    pub fn items_processed(&self) -> u64 {
        match self {
            MigrationError::UnitFailed {
                items_processed, ..
            }
            | MigrationError::Cancelled { items_processed } => *items_processed,
            MigrationError::Unknown(_) => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// MigrationExecutor
// ---------------------------------------------------------------------------

/// Runs a migration plan unit by unit with retry, timeout, and
/// cooperative cancellation.
///
/// The executor does not re-check endpoint verification; the caller
/// guarantees both snapshots were verified at invocation time.
pub struct MigrationExecutor {
    driver: Arc<dyn MigrationDriver>,
    retry: RetryConfig,
}

impl MigrationExecutor {
    pub fn new(driver: Arc<dyn MigrationDriver>, retry: RetryConfig) -> Self {
        Self { driver, retry }
    }

    /// Execute the full transfer.
    ///
    /// After each committed unit the cumulative count is sent on
    /// `progress`. Cancellation is honored between units and during
    /// backoff sleeps, never mid-unit; a cancelled run reports the units
    /// committed so far.
    pub async fn run(
        &self,
        source: &EndpointSnapshot,
        dest: &EndpointSnapshot,
        progress: mpsc::UnboundedSender<u64>,
        cancel: CancellationToken,
    ) -> Result<MigrationSummary, MigrationError> {
        let started_at = Utc::now();

        let units = self
            .driver
            .plan(source, dest)
            .await
            .map_err(|e| MigrationError::Unknown(format!("planning failed: {e}")))?;

        tracing::info!(units = units.len(), "Migration plan ready");

        let mut items_processed = 0u64;
        for unit in &units {
            if cancel.is_cancelled() {
                tracing::info!(items_processed, "Migration cancelled at unit boundary");
                return Err(MigrationError::Cancelled { items_processed });
            }

            self.apply_with_retry(source, dest, unit, items_processed, &cancel)
                .await?;

            items_processed += 1;
            // Receiver gone only means nobody is watching progress.
            let _ = progress.send(items_processed);
            tracing::debug!(unit = %unit.label, items_processed, "Unit committed");
        }

        Ok(MigrationSummary {
            items_processed,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Apply one unit within the retry budget.
    ///
    /// A timed-out attempt counts against the budget like any other
    /// failure. The backoff sleep is cancellation-aware so an operator
    /// does not wait out a 30s delay for the token to be honored.
    async fn apply_with_retry(
        &self,
        source: &EndpointSnapshot,
        dest: &EndpointSnapshot,
        unit: &MigrationUnit,
        items_processed: u64,
        cancel: &CancellationToken,
    ) -> Result<(), MigrationError> {
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(
                self.retry.unit_timeout,
                self.driver.apply(source, dest, unit),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(UnitError(format!(
                    "timed out after {}s",
                    self.retry.unit_timeout.as_secs()
                ))),
            };

            let cause = match result {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!(unit = %unit.label, attempt, "Unit succeeded on retry");
                    }
                    return Ok(());
                }
                Err(cause) => cause,
            };

            tracing::warn!(
                unit = %unit.label,
                attempt,
                error = %cause,
                "Unit attempt failed",
            );

            if attempt >= self.retry.max_attempts {
                return Err(MigrationError::UnitFailed {
                    unit: unit.label.clone(),
                    attempts: attempt,
                    items_processed,
                    cause,
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(unit = %unit.label, "Cancelled during backoff");
                    return Err(MigrationError::Cancelled { items_processed });
                }
                _ = tokio::time::sleep(delay) => {}
            }

            delay = next_delay(delay, &self.retry);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
