//! The top-level coordinator.
//!
//! [`Orchestrator`] owns all mutable state (two [`ConnectionState`]s
//! and the [`MigrationJob`]) behind a single `RwLock`. Verification probes and the migration run execute on
//! spawned tasks, but every result is applied back through that lock,
//! so the gating check in [`Orchestrator::request_migration`] is atomic
//! with respect to concurrent credential edits and verification
//! responses.

use std::sync::Arc;
use std::time::Duration;

use dbshift_core::{
    ConnectionRole, ConnectionState, CredentialField, VerificationStatus,
};
use dbshift_events::{LogStream, Notifier, Severity};
use dbshift_migrate::{MigrationDriver, MigrationExecutor, RetryConfig};
use dbshift_verify::{EndpointVerifier, VerificationError};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::OrchestratorError;
use crate::job::MigrationJob;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Per-unit retry policy handed to the migration executor.
    pub retry: RetryConfig,
    /// Backstop timeout around a verification probe. The verifier is
    /// expected to bound itself; this guards against a driver that
    /// does not.
    pub verify_timeout: Duration,
    /// Buffer capacity of the activity-log broadcast channel.
    pub log_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            verify_timeout: Duration::from_secs(15),
            log_capacity: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Read-only projection of one endpoint for a presentation layer.
///
/// Secrets never cross this boundary; only completeness is exposed.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSnapshot {
    pub role: ConnectionRole,
    #[serde(flatten)]
    pub status: VerificationStatus,
    pub request_epoch: u64,
    pub credentials_complete: bool,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// All state the orchestrator mutates, behind the single lock.
struct Inner {
    source: ConnectionState,
    destination: ConnectionState,
    job: MigrationJob,
    /// Cancel token of the running migration, if any.
    migration_cancel: Option<CancellationToken>,
}

impl Inner {
    fn conn_mut(&mut self, role: ConnectionRole) -> &mut ConnectionState {
        match role {
            ConnectionRole::Source => &mut self.source,
            ConnectionRole::Destination => &mut self.destination,
        }
    }

    fn conn(&self, role: ConnectionRole) -> &ConnectionState {
        match role {
            ConnectionRole::Source => &self.source,
            ConnectionRole::Destination => &self.destination,
        }
    }
}

/// Coordinator of verification and migration for one endpoint pair.
///
/// Cheap to share behind an `Arc`; all public operations take `&self`.
pub struct Orchestrator {
    state: Arc<RwLock<Inner>>,
    log: Arc<LogStream>,
    notifier: Arc<Notifier>,
    verifier: Arc<dyn EndpointVerifier>,
    executor: Arc<MigrationExecutor>,
    verify_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        verifier: Arc<dyn EndpointVerifier>,
        driver: Arc<dyn MigrationDriver>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(Inner {
                source: ConnectionState::new(ConnectionRole::Source),
                destination: ConnectionState::new(ConnectionRole::Destination),
                job: MigrationJob::idle(),
                migration_cancel: None,
            })),
            log: Arc::new(LogStream::new(config.log_capacity)),
            notifier: Arc::new(Notifier::default()),
            verifier,
            executor: Arc::new(MigrationExecutor::new(driver, config.retry)),
            verify_timeout: config.verify_timeout,
        }
    }

    // ---- credential editing ----

    /// Replace one credential field for a role.
    ///
    /// Silent: nothing is logged for keystrokes. Any prior `Verified`,
    /// `Failed`, or in-flight `Verifying` outcome for the role is
    /// invalidated.
    pub async fn update_credentials(
        &self,
        role: ConnectionRole,
        field: CredentialField,
        value: impl Into<String>,
    ) {
        let mut inner = self.state.write().await;
        inner.conn_mut(role).update_field(field, value);
    }

    // ---- verification ----

    /// Dispatch an asynchronous verification probe for a role.
    ///
    /// Fails fast, with no probe, log entry, or epoch advance, when the
    /// credentials are incomplete or a probe for this role is already
    /// in flight. Otherwise the role transitions to `Verifying`,
    /// `"Verifying {role} database connection..."` is appended to the
    /// log, and the probe runs on a spawned task. Its outcome is applied
    /// only if the captured epoch is still current.
    pub async fn request_verification(
        &self,
        role: ConnectionRole,
    ) -> Result<(), OrchestratorError> {
        let (epoch, credentials) = {
            let mut inner = self.state.write().await;
            let conn = inner.conn_mut(role);

            if !conn.credentials().is_complete() {
                return Err(OrchestratorError::IncompleteCredentials(role));
            }
            if conn.status().is_verifying() {
                return Err(OrchestratorError::VerificationInFlight(role));
            }

            let epoch = conn.begin_verification();
            let credentials = conn.credentials().clone();
            // Append under the lock so the entry order matches the
            // state-transition order.
            self.log.info(format!("Verifying {role} database connection..."));
            (epoch, credentials)
        };

        tracing::info!(role = role.as_str(), epoch, "Verification dispatched");

        let state = Arc::clone(&self.state);
        let log = Arc::clone(&self.log);
        let notifier = Arc::clone(&self.notifier);
        let verifier = Arc::clone(&self.verifier);
        let verify_timeout = self.verify_timeout;

        tokio::spawn(async move {
            let outcome =
                match tokio::time::timeout(verify_timeout, verifier.verify(&credentials)).await {
                    Ok(result) => result,
                    Err(_) => Err(VerificationError::Timeout),
                };

            let mut inner = state.write().await;
            if !inner.conn_mut(role).apply_outcome(epoch, outcome.clone()) {
                tracing::debug!(
                    role = role.as_str(),
                    epoch,
                    "Discarding verification response from superseded request",
                );
                return;
            }

            match outcome {
                Ok(_) => {
                    let message = format!("{role} database connection verified successfully");
                    log.success(message.clone());
                    notifier.notify(Severity::Info, message);
                }
                Err(error) => {
                    log.error(format!(
                        "Failed to verify {role} database connection: {error}"
                    ));
                    notifier.notify(
                        Severity::Destructive,
                        format!("Failed to verify {role} database connection"),
                    );
                }
            }
        });

        Ok(())
    }

    // ---- migration ----

    /// Request the migration run.
    ///
    /// Accepted only when both endpoints are `Verified` and no job is
    /// running; the check and the job creation happen under one write
    /// lock, so a concurrent credential edit or second request cannot
    /// slip between them. Returns the accepted job's id.
    pub async fn request_migration(&self) -> Result<Uuid, OrchestratorError> {
        let (source, dest, cancel, job_id) = {
            let mut inner = self.state.write().await;

            if inner.job.is_running()
                || !inner.source.status().is_verified()
                || !inner.destination.status().is_verified()
            {
                return Err(OrchestratorError::NotReady);
            }

            let source = inner.source.snapshot();
            let dest = inner.destination.snapshot();
            let job = MigrationJob::start();
            let job_id = job.id.unwrap_or_default();
            inner.job = job;

            let cancel = CancellationToken::new();
            inner.migration_cancel = Some(cancel.clone());

            self.log.info("Starting database migration...");
            (source, dest, cancel, job_id)
        };

        tracing::info!(job_id = %job_id, "Migration accepted");

        let state = Arc::clone(&self.state);
        let log = Arc::clone(&self.log);
        let notifier = Arc::clone(&self.notifier);
        let executor = Arc::clone(&self.executor);

        tokio::spawn(async move {
            let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
            let run = executor.run(&source, &dest, progress_tx, cancel);
            tokio::pin!(run);

            // Apply progress as it arrives; break on the terminal result.
            let result = loop {
                tokio::select! {
                    Some(count) = progress_rx.recv() => {
                        state.write().await.job.items_processed = count;
                    }
                    result = &mut run => break result,
                }
            };

            let mut inner = state.write().await;
            // Drain progress reports that raced the terminal result.
            while let Ok(count) = progress_rx.try_recv() {
                inner.job.items_processed = count;
            }
            inner.migration_cancel = None;

            match result {
                Ok(summary) => {
                    inner.job.complete(summary.items_processed);
                    log.success("Migration completed successfully");
                    notifier.notify(Severity::Info, "Migration completed successfully");
                }
                Err(error) => {
                    inner.job.fail(error.items_processed(), error.to_string());
                    log.error(format!("Migration failed: {error}"));
                    notifier.notify(Severity::Destructive, "Migration failed");
                }
            }
        });

        Ok(job_id)
    }

    /// Request cooperative cancellation of the running migration.
    ///
    /// Honored at the next unit boundary (or backoff sleep); a no-op
    /// when no migration is running.
    pub async fn cancel_migration(&self) {
        let inner = self.state.read().await;
        if let Some(cancel) = &inner.migration_cancel {
            tracing::info!("Migration cancellation requested");
            cancel.cancel();
        }
    }

    // ---- read-only projections ----

    /// Current view of one endpoint.
    pub async fn connection(&self, role: ConnectionRole) -> ConnectionSnapshot {
        let inner = self.state.read().await;
        let conn = inner.conn(role);
        ConnectionSnapshot {
            role,
            status: conn.status().clone(),
            request_epoch: conn.request_epoch(),
            credentials_complete: conn.credentials().is_complete(),
        }
    }

    /// Current view of the migration job.
    pub async fn job(&self) -> MigrationJob {
        self.state.read().await.job.clone()
    }

    /// The activity log (history replay + live subscription).
    pub fn log(&self) -> &LogStream {
        &self.log
    }

    /// The advisory notification channel.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
