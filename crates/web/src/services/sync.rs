//! The Domino sync engine.
//!
//! A background loop ticks at a fixed rate and runs every integration that
//! is due. The contract a run honors:
//!
//! - An inactive integration never runs, scheduled or manual.
//! - A run happens at most once per `sync_interval` minutes, measured from
//!   the last attempt (completed or not).
//! - At most one run per integration is in flight at a time, guaranteed by
//!   a database lease keyed by integration id.
//! - The include flags gate which categories are fetched; the status filter
//!   decides which fetched records are imported, and an empty filter
//!   imports nothing. A run with nothing to pull still completes and
//!   advances `last_sync_at`, so it is not retried in a tight loop.
//! - A record that fails to import is counted and skipped over; a category
//!   that fails to fetch aborts the run without touching `last_sync_at` or
//!   `is_active`, and the retry waits for the next interval.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};

use itadaki_core::IntegrationId;

use crate::db::{ImportRepository, IntegrationRepository, RepositoryError};
use crate::domino::{DominoClient, DominoError};
use crate::models::DominoIntegration;

/// How often the scheduler looks for due integrations.
pub const SCHEDULER_TICK: std::time::Duration = std::time::Duration::from_secs(60);

/// How long a run may hold the lease before it is considered crashed.
fn lease_ttl() -> Duration {
    Duration::minutes(10)
}

/// Errors from a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The integration's master switch is off.
    #[error("integration {0} is inactive")]
    Inactive(IntegrationId),

    /// Another run currently holds the lease for this integration.
    #[error("a run is already in flight for integration {0}")]
    LeaseHeld(IntegrationId),

    /// Local persistence failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Fetching a category from Domino failed; the run was aborted.
    #[error("domino error: {0}")]
    Domino(#[from] DominoError),
}

/// Outcome of one completed sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub integration_id: IntegrationId,
    /// Run start time; `last_sync_at` was set to this.
    pub started_at: DateTime<Utc>,
    /// Records actually written locally.
    pub imported: u64,
    /// Records that failed to import; the run carried on past them.
    pub failed: u64,
    /// Records fetched but excluded by the status filter.
    pub skipped: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct RunCounts {
    imported: u64,
    failed: u64,
    skipped: u64,
}

/// The sync engine.
pub struct SyncService {
    pool: PgPool,
}

impl SyncService {
    /// Create a sync service on a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One scheduler tick: run every active integration that is due.
    ///
    /// Failures are logged, never propagated; the next tick retries
    /// whatever is still due then.
    #[instrument(skip(self))]
    pub async fn run_due(&self) {
        let now = Utc::now();
        let repo = IntegrationRepository::new(&self.pool);
        let integrations = match repo.list_active().await {
            Ok(integrations) => integrations,
            Err(e) => {
                error!(error = %e, "failed to list integrations for scheduling");
                return;
            }
        };

        for integration in integrations {
            if !integration.sync_due(now) {
                continue;
            }
            match self.run_integration(&integration).await {
                Ok(report) => info!(
                    integration_id = %report.integration_id,
                    imported = report.imported,
                    failed = report.failed,
                    skipped = report.skipped,
                    "sync run completed"
                ),
                Err(SyncError::LeaseHeld(id)) => {
                    debug!(integration_id = %id, "sync run skipped, lease held");
                }
                Err(e) => error!(
                    integration_id = %integration.id,
                    error = %e,
                    "sync run failed"
                ),
            }
        }
    }

    /// Execute one run for an integration.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Inactive` for an inactive integration,
    /// `SyncError::LeaseHeld` when a run is already in flight, and
    /// `SyncError::Domino` when a category fetch failed (the run is
    /// aborted, `last_sync_at` untouched).
    #[instrument(skip(self, integration), fields(integration_id = %integration.id))]
    pub async fn run_integration(
        &self,
        integration: &DominoIntegration,
    ) -> Result<SyncReport, SyncError> {
        if !integration.is_active {
            return Err(SyncError::Inactive(integration.id));
        }

        let repo = IntegrationRepository::new(&self.pool);
        let started_at = Utc::now();
        if !repo.begin_run(integration.id, started_at, lease_ttl()).await? {
            return Err(SyncError::LeaseHeld(integration.id));
        }

        match self.pull_records(integration).await {
            Ok(counts) => {
                let imported = i64::try_from(counts.imported).unwrap_or(i64::MAX);
                repo.finish_run(integration.id, started_at, imported).await?;
                Ok(SyncReport {
                    integration_id: integration.id,
                    started_at,
                    imported: counts.imported,
                    failed: counts.failed,
                    skipped: counts.skipped,
                })
            }
            Err(e) => {
                // Release the lease only; last_sync_at stays as it was, and
                // last_attempted_at (stamped at lease time) defers the retry
                // to the next interval.
                if let Err(release_err) = repo.abort_run(integration.id).await {
                    error!(error = %release_err, "failed to release sync lease");
                }
                Err(e)
            }
        }
    }

    /// Fetch and import everything the settings select.
    async fn pull_records(&self, integration: &DominoIntegration) -> Result<RunCounts, SyncError> {
        let settings = &integration.sync;
        let mut counts = RunCounts::default();

        // Nothing selected or nothing importable: the run completes empty
        // rather than being skipped, so last_sync_at still advances.
        if settings.includes_nothing() {
            debug!("no record category selected, completing empty run");
            return Ok(counts);
        }
        if settings.status_filter.is_empty() {
            debug!("empty status filter, completing empty run");
            return Ok(counts);
        }

        let client = DominoClient::for_integration(integration)?;
        let imports = ImportRepository::new(&self.pool);

        if settings.include_jobs {
            for job in client.fetch_jobs(&settings.status_filter).await? {
                if !settings.status_allowed(&job.status) {
                    counts.skipped += 1;
                    continue;
                }
                match imports.upsert_job(&job).await {
                    Ok(()) => counts.imported += 1,
                    Err(e) => {
                        counts.failed += 1;
                        warn!(error = %e, domino_id = %job.id, "failed to import job");
                    }
                }
            }
        }

        if settings.include_leads {
            for lead in client.fetch_leads(&settings.status_filter).await? {
                if !settings.status_allowed(&lead.status) {
                    counts.skipped += 1;
                    continue;
                }
                match imports.upsert_lead(&lead).await {
                    Ok(()) => counts.imported += 1,
                    Err(e) => {
                        counts.failed += 1;
                        warn!(error = %e, domino_id = %lead.id, "failed to import lead");
                    }
                }
            }
        }

        if settings.include_shops {
            for shop in client.fetch_shops(&settings.status_filter).await? {
                if !settings.status_allowed(&shop.status) {
                    counts.skipped += 1;
                    continue;
                }
                match imports.upsert_shop(&shop).await {
                    Ok(()) => counts.imported += 1,
                    Err(e) => {
                        counts.failed += 1;
                        warn!(error = %e, domino_id = %shop.id, "failed to import shop");
                    }
                }
            }
        }

        Ok(counts)
    }
}

/// Spawn the background scheduler loop.
///
/// The task runs until aborted; the server aborts it on shutdown.
pub fn spawn_scheduler(
    service: SyncService,
    tick: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            service.run_due().await;
        }
    })
}
