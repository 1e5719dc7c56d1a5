//! Domino integration domain type.
//!
//! This is the configuration contract a sync run must honor; the engine
//! that honors it lives in [`crate::services::sync`].

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use url::Url;

use itadaki_core::{IntegrationId, SyncSettings};

use crate::config;

/// A connection to the external Domino system.
///
/// Implements `Debug` manually to redact the API key. The key never reaches
/// a display surface in full; use [`DominoIntegration::masked_api_key`].
#[derive(Clone)]
pub struct DominoIntegration {
    /// Unique integration ID.
    pub id: IntegrationId,
    /// Credential for the Domino API.
    pub api_key: SecretString,
    /// Base URL of this integration's Domino endpoint.
    pub base_url: Url,
    /// Callback URL registered with Domino, if any.
    pub webhook_url: Option<Url>,
    /// Master switch: when false, no sync may run at all.
    pub is_active: bool,
    /// What a run pulls, and how often.
    pub sync: SyncSettings,
    /// Start time of the last completed run.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Start time of the last attempted run, completed or not.
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// Total records imported across all runs.
    pub total_imports: i64,
    /// When the integration was created.
    pub created_at: DateTime<Utc>,
    /// When the integration was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for DominoIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DominoIntegration")
            .field("id", &self.id)
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("is_active", &self.is_active)
            .field("sync", &self.sync)
            .field("last_sync_at", &self.last_sync_at)
            .field("total_imports", &self.total_imports)
            .finish_non_exhaustive()
    }
}

impl DominoIntegration {
    /// The API key truncated to a safe-to-display prefix.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        config::mask_secret(Some(&self.api_key))
    }

    /// Whether the scheduler should start a run now.
    ///
    /// False whenever the integration is inactive or auto-sync is off,
    /// regardless of every other setting. Otherwise a run is due once
    /// `sync_interval` has elapsed since the last attempt (completed or
    /// not), or immediately if there has never been one.
    #[must_use]
    pub fn sync_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || !self.sync.auto_sync {
            return false;
        }
        match self.last_sync_at.max(self.last_attempted_at) {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.sync.sync_interval.as_duration(),
        }
    }
}
