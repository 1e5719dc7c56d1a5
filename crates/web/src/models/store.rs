//! Store domain types.
//!
//! A store is a restaurant under contract with the agency. Stores are never
//! hard-deleted; closing one transitions its status to `closed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use itadaki_core::{BusinessType, CompanyId, StoreId, StoreStatus};

/// A store (domain type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Owning company. Referential integrity is enforced by the database.
    pub company_id: CompanyId,
    /// Store name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Kind of restaurant.
    pub business_type: BusinessType,
    /// Official website, if any.
    pub website_url: Option<Url>,
    /// Food-review-site page, if any.
    pub review_site_url: Option<Url>,
    /// Social media page, if any.
    pub social_url: Option<Url>,
    /// Operating status.
    pub status: StoreStatus,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub company_id: CompanyId,
    pub name: String,
    pub address: String,
    pub business_type: BusinessType,
    pub website_url: Option<Url>,
    pub review_site_url: Option<Url>,
    pub social_url: Option<Url>,
}

/// Payload for editing a store. The edit form posts the full new state.
#[derive(Debug, Clone)]
pub struct UpdateStore {
    pub name: String,
    pub address: String,
    pub business_type: BusinessType,
    pub website_url: Option<Url>,
    pub review_site_url: Option<Url>,
    pub social_url: Option<Url>,
}
