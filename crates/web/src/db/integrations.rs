//! Domino integration repository.
//!
//! Also owns the run lease: `sync_started_at` is the mutual-exclusion slot
//! keyed by integration id that guarantees at most one concurrent run per
//! integration, with a TTL so a crashed worker cannot hold it forever.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use url::Url;

use itadaki_core::{IntegrationId, SyncInterval, SyncSettings};

use super::RepositoryError;
use crate::models::DominoIntegration;

const INTEGRATION_COLUMNS: &str =
    "id, api_key, base_url, webhook_url, is_active, auto_sync, sync_interval_minutes, \
     include_jobs, include_leads, include_shops, status_filter, last_sync_at, \
     last_attempted_at, total_imports, created_at, updated_at";

/// Internal row type for integration queries.
#[derive(Debug, sqlx::FromRow)]
struct IntegrationRow {
    id: i64,
    api_key: String,
    base_url: String,
    webhook_url: Option<String>,
    is_active: bool,
    auto_sync: bool,
    sync_interval_minutes: i32,
    include_jobs: bool,
    include_leads: bool,
    include_shops: bool,
    status_filter: Vec<String>,
    last_sync_at: Option<DateTime<Utc>>,
    last_attempted_at: Option<DateTime<Utc>>,
    total_imports: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IntegrationRow> for DominoIntegration {
    type Error = RepositoryError;

    fn try_from(row: IntegrationRow) -> Result<Self, Self::Error> {
        let base_url = Url::parse(&row.base_url).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid base_url in database: {e}"))
        })?;
        let webhook_url = row
            .webhook_url
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid webhook_url in database: {e}"))
                })
            })
            .transpose()?;
        let minutes = u32::try_from(row.sync_interval_minutes).map_err(|_| {
            RepositoryError::DataCorruption("negative sync_interval_minutes in database".to_owned())
        })?;
        let sync_interval = SyncInterval::new(minutes).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid sync_interval_minutes: {e}"))
        })?;

        Ok(Self {
            id: IntegrationId::new(row.id),
            api_key: SecretString::from(row.api_key),
            base_url,
            webhook_url,
            is_active: row.is_active,
            sync: SyncSettings {
                auto_sync: row.auto_sync,
                sync_interval,
                include_jobs: row.include_jobs,
                include_leads: row.include_leads,
                include_shops: row.include_shops,
                status_filter: row.status_filter.into_iter().collect::<BTreeSet<_>>(),
            },
            last_sync_at: row.last_sync_at,
            last_attempted_at: row.last_attempted_at,
            total_imports: row.total_imports,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Payload for registering an integration (used by seeding and tests).
#[derive(Debug)]
pub struct NewIntegration {
    pub api_key: SecretString,
    pub base_url: Url,
    pub webhook_url: Option<Url>,
    pub is_active: bool,
    pub sync: SyncSettings,
}

/// Repository for Domino integration database operations.
pub struct IntegrationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> IntegrationRepository<'a> {
    /// Create a new integration repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all integrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<DominoIntegration>, RepositoryError> {
        let rows = sqlx::query_as::<_, IntegrationRow>(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM domino_integration ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List integrations whose master switch is on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_active(&self) -> Result<Vec<DominoIntegration>, RepositoryError> {
        let rows = sqlx::query_as::<_, IntegrationRow>(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM domino_integration WHERE is_active ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an integration by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(
        &self,
        id: IntegrationId,
    ) -> Result<Option<DominoIntegration>, RepositoryError> {
        let row = sqlx::query_as::<_, IntegrationRow>(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM domino_integration WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Register a new integration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        new_integration: &NewIntegration,
    ) -> Result<DominoIntegration, RepositoryError> {
        let status_filter: Vec<String> =
            new_integration.sync.status_filter.iter().cloned().collect();
        let row = sqlx::query_as::<_, IntegrationRow>(&format!(
            "INSERT INTO domino_integration
                 (api_key, base_url, webhook_url, is_active, auto_sync,
                  sync_interval_minutes, include_jobs, include_leads, include_shops,
                  status_filter)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {INTEGRATION_COLUMNS}"
        ))
        .bind(new_integration.api_key.expose_secret())
        .bind(new_integration.base_url.as_str())
        .bind(new_integration.webhook_url.as_ref().map(Url::as_str))
        .bind(new_integration.is_active)
        .bind(new_integration.sync.auto_sync)
        .bind(i32::try_from(new_integration.sync.sync_interval.minutes()).unwrap_or(i32::MAX))
        .bind(new_integration.sync.include_jobs)
        .bind(new_integration.sync.include_leads)
        .bind(new_integration.sync.include_shops)
        .bind(&status_filter)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Replace an integration's sync settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the integration doesn't exist,
    /// or `RepositoryError::Database` for other database errors.
    pub async fn update_settings(
        &self,
        id: IntegrationId,
        is_active: bool,
        settings: &SyncSettings,
    ) -> Result<DominoIntegration, RepositoryError> {
        let status_filter: Vec<String> = settings.status_filter.iter().cloned().collect();
        let row = sqlx::query_as::<_, IntegrationRow>(&format!(
            "UPDATE domino_integration
             SET is_active = $1, auto_sync = $2, sync_interval_minutes = $3,
                 include_jobs = $4, include_leads = $5, include_shops = $6,
                 status_filter = $7, updated_at = NOW()
             WHERE id = $8
             RETURNING {INTEGRATION_COLUMNS}"
        ))
        .bind(is_active)
        .bind(settings.auto_sync)
        .bind(i32::try_from(settings.sync_interval.minutes()).unwrap_or(i32::MAX))
        .bind(settings.include_jobs)
        .bind(settings.include_leads)
        .bind(settings.include_shops)
        .bind(&status_filter)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Try to take the run lease for an integration.
    ///
    /// Atomically stamps `sync_started_at` and `last_attempted_at` if the
    /// integration is active and no unexpired lease is held. Returns whether
    /// the lease was acquired; `false` means another run is in flight (or
    /// the integration went inactive since it was read).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn begin_run(
        &self,
        id: IntegrationId,
        started_at: DateTime<Utc>,
        lease_ttl: Duration,
    ) -> Result<bool, RepositoryError> {
        let expired_before = started_at - lease_ttl;
        let result = sqlx::query(
            "UPDATE domino_integration
             SET sync_started_at = $2, last_attempted_at = $2
             WHERE id = $1
               AND is_active
               AND (sync_started_at IS NULL OR sync_started_at < $3)",
        )
        .bind(id.as_i64())
        .bind(started_at)
        .bind(expired_before)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record a completed run and release the lease.
    ///
    /// `last_sync_at` is set to the run's start time and `total_imports` is
    /// incremented by the records actually imported (not attempted).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the integration doesn't exist,
    /// or `RepositoryError::Database` for other database errors.
    pub async fn finish_run(
        &self,
        id: IntegrationId,
        started_at: DateTime<Utc>,
        imported: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE domino_integration
             SET last_sync_at = $2, total_imports = total_imports + $3,
                 sync_started_at = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(started_at)
        .bind(imported)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Release the lease after a failed run.
    ///
    /// `last_sync_at` and `total_imports` are left untouched; the stamped
    /// `last_attempted_at` defers the retry to the next interval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn abort_run(&self, id: IntegrationId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE domino_integration SET sync_started_at = NULL WHERE id = $1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
