//! Store repository.
//!
//! Queries use the sqlx runtime API; rows come back as strings where the
//! domain has closed-set enums, and the `TryFrom` conversion is the single
//! place stored data is re-validated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use url::Url;

use itadaki_core::{BusinessType, CompanyId, StoreId, StoreStatus};

use super::RepositoryError;
use crate::models::{NewStore, Store, UpdateStore};

const STORE_COLUMNS: &str = "id, company_id, name, address, business_type, website_url, \
                             review_site_url, social_url, status, created_at, updated_at";

/// Internal row type for store queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i64,
    company_id: i64,
    name: String,
    address: String,
    business_type: String,
    website_url: Option<String>,
    review_site_url: Option<String>,
    social_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_optional_url(
    value: Option<String>,
    column: &str,
) -> Result<Option<Url>, RepositoryError> {
    value
        .map(|raw| {
            Url::parse(&raw).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
            })
        })
        .transpose()
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let business_type: BusinessType = row.business_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid business_type in database: {e}"))
        })?;
        let status: StoreStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            company_id: CompanyId::new(row.company_id),
            name: row.name,
            address: row.address,
            business_type,
            website_url: parse_optional_url(row.website_url, "website_url")?,
            review_site_url: parse_optional_url(row.review_site_url, "review_site_url")?,
            social_url: parse_optional_url(row.social_url, "social_url")?,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all stores, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a store by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM store WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Count stores that are currently open.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_open(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM store WHERE status = 'open'")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Create a new store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owning company does not
    /// exist, or `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_store: &NewStore) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO store (company_id, name, address, business_type, website_url, \
                                review_site_url, social_url, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'open')
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(new_store.company_id.as_i64())
        .bind(&new_store.name)
        .bind(&new_store.address)
        .bind(new_store.business_type.to_string())
        .bind(new_store.website_url.as_ref().map(Url::as_str))
        .bind(new_store.review_site_url.as_ref().map(Url::as_str))
        .bind(new_store.social_url.as_ref().map(Url::as_str))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("company does not exist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Update a store from the full edit payload.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: StoreId,
        update: &UpdateStore,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "UPDATE store
             SET name = $1, address = $2, business_type = $3, website_url = $4,
                 review_site_url = $5, social_url = $6, updated_at = NOW()
             WHERE id = $7
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(&update.name)
        .bind(&update.address)
        .bind(update.business_type.to_string())
        .bind(update.website_url.as_ref().map(Url::as_str))
        .bind(update.review_site_url.as_ref().map(Url::as_str))
        .bind(update.social_url.as_ref().map(Url::as_str))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Close a store. Stores are never deleted; this is the terminal state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist, or
    /// `RepositoryError::Database` for other database errors.
    pub async fn close(&self, id: StoreId) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "UPDATE store SET status = 'closed', updated_at = NOW()
             WHERE id = $1
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> StoreRow {
        StoreRow {
            id: 1,
            company_id: 2,
            name: "すし処 いただき".to_owned(),
            address: "東京都中央区築地1-2-3".to_owned(),
            business_type: "kaiten".to_owned(),
            website_url: Some("https://example.com/".to_owned()),
            review_site_url: None,
            social_url: None,
            status: "open".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let store = Store::try_from(row()).unwrap();
        assert_eq!(store.id, StoreId::new(1));
        assert_eq!(store.business_type, BusinessType::Kaiten);
        assert_eq!(store.status, StoreStatus::Open);
        assert_eq!(store.website_url.unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn test_row_conversion_rejects_unknown_business_type() {
        let mut bad = row();
        bad.business_type = "izakaya".to_owned();
        assert!(matches!(
            Store::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_conversion_rejects_invalid_url() {
        let mut bad = row();
        bad.website_url = Some("not a url".to_owned());
        assert!(matches!(
            Store::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
