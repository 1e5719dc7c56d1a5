//! Repository for records imported from Domino.
//!
//! Sync runs upsert into staging tables keyed by the Domino-side ID, so a
//! re-import of the same record is an update, not a duplicate. The public
//! job listing renders from `domino_job`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::domino::types::{DominoJob, DominoLead, DominoShop};

/// A job imported from Domino, as served to the public listing.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ImportedJob {
    /// Local ID (used in public URLs).
    pub id: i64,
    /// Domino-side ID.
    pub domino_id: String,
    pub title: String,
    pub shop_name: Option<String>,
    pub employment_type: Option<String>,
    pub hourly_wage: Option<Decimal>,
    pub status: String,
    /// When the record was last pulled.
    pub synced_at: DateTime<Utc>,
}

/// Repository for imported Domino records.
pub struct ImportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImportRepository<'a> {
    /// Create a new import repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upsert a job record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_job(&self, job: &DominoJob) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO domino_job (domino_id, title, shop_name, employment_type, hourly_wage, status, synced_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (domino_id) DO UPDATE
             SET title = EXCLUDED.title, shop_name = EXCLUDED.shop_name,
                 employment_type = EXCLUDED.employment_type,
                 hourly_wage = EXCLUDED.hourly_wage, status = EXCLUDED.status,
                 synced_at = NOW()",
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(job.shop_name.as_deref())
        .bind(job.employment_type.as_deref())
        .bind(job.hourly_wage)
        .bind(&job.status)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Upsert a lead record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_lead(&self, lead: &DominoLead) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO domino_lead (domino_id, name, email, phone, status, synced_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             ON CONFLICT (domino_id) DO UPDATE
             SET name = EXCLUDED.name, email = EXCLUDED.email, phone = EXCLUDED.phone,
                 status = EXCLUDED.status, synced_at = NOW()",
        )
        .bind(&lead.id)
        .bind(&lead.name)
        .bind(lead.email.as_deref())
        .bind(lead.phone.as_deref())
        .bind(&lead.status)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Upsert a shop record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_shop(&self, shop: &DominoShop) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO domino_shop (domino_id, name, address, status, synced_at)
             VALUES ($1, $2, $3, $4, NOW())
             ON CONFLICT (domino_id) DO UPDATE
             SET name = EXCLUDED.name, address = EXCLUDED.address,
                 status = EXCLUDED.status, synced_at = NOW()",
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(shop.address.as_deref())
        .bind(&shop.status)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// List imported jobs for the public listing, most recently synced first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_jobs(&self, limit: i64) -> Result<Vec<ImportedJob>, RepositoryError> {
        let jobs = sqlx::query_as::<_, ImportedJob>(
            "SELECT id, domino_id, title, shop_name, employment_type, hourly_wage, status, synced_at
             FROM domino_job ORDER BY synced_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(jobs)
    }

    /// Get one imported job by its local ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_job(&self, id: i64) -> Result<Option<ImportedJob>, RepositoryError> {
        let job = sqlx::query_as::<_, ImportedJob>(
            "SELECT id, domino_id, title, shop_name, employment_type, hourly_wage, status, synced_at
             FROM domino_job WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(job)
    }

    /// Count imported jobs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_jobs(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domino_job")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count imported leads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_leads(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domino_lead")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Count imported shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_shops(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domino_shop")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
