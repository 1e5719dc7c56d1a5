//! Domino synchronization settings.
//!
//! [`SyncSettings`] is the configuration contract a sync run must honor: it
//! does not run a scheduler itself, it specifies the polling cadence and the
//! inclusion predicate for one integration.

use std::collections::BTreeSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Error returned when a sync interval is not a positive number of minutes.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sync interval must be a positive number of minutes")]
pub struct SyncIntervalError;

/// Polling cadence in minutes. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SyncInterval(u32);

impl SyncInterval {
    /// Default cadence for new integrations: hourly.
    pub const DEFAULT: Self = Self(60);

    /// Create an interval from a number of minutes.
    ///
    /// # Errors
    ///
    /// Returns [`SyncIntervalError`] if `minutes` is zero.
    pub const fn new(minutes: u32) -> Result<Self, SyncIntervalError> {
        if minutes == 0 {
            Err(SyncIntervalError)
        } else {
            Ok(Self(minutes))
        }
    }

    /// The interval in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// The interval as a chrono [`Duration`].
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

impl Default for SyncInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl<'de> Deserialize<'de> for SyncInterval {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let minutes = u32::deserialize(deserializer)?;
        Self::new(minutes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for SyncInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}min", self.0)
    }
}

/// Which records a sync run pulls from Domino, and how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Whether the scheduler may start runs for this integration at all.
    pub auto_sync: bool,
    /// Minimum gap between two runs.
    pub sync_interval: SyncInterval,
    /// Pull job postings.
    pub include_jobs: bool,
    /// Pull candidate leads.
    pub include_leads: bool,
    /// Pull shop records.
    pub include_shops: bool,
    /// Only records whose status is in this set are imported. The empty set
    /// imports nothing; it never means "import everything".
    pub status_filter: BTreeSet<String>,
}

impl SyncSettings {
    /// Whether no record category is selected for pulling.
    #[must_use]
    pub const fn includes_nothing(&self) -> bool {
        !self.include_jobs && !self.include_leads && !self.include_shops
    }

    /// Whether a record with `status` passes the status filter.
    #[must_use]
    pub fn status_allowed(&self, status: &str) -> bool {
        self.status_filter.contains(status)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_sync: false,
            sync_interval: SyncInterval::DEFAULT,
            include_jobs: true,
            include_leads: true,
            include_shops: true,
            status_filter: BTreeSet::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rejects_zero() {
        assert_eq!(SyncInterval::new(0), Err(SyncIntervalError));
        assert_eq!(SyncInterval::new(1).unwrap().minutes(), 1);
    }

    #[test]
    fn test_interval_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<SyncInterval>("0").is_err());
        let interval: SyncInterval = serde_json::from_str("15").unwrap();
        assert_eq!(interval.minutes(), 15);
    }

    #[test]
    fn test_interval_duration() {
        let interval = SyncInterval::new(30).unwrap();
        assert_eq!(interval.as_duration(), Duration::minutes(30));
    }

    #[test]
    fn test_includes_nothing() {
        let mut settings = SyncSettings::default();
        assert!(!settings.includes_nothing());
        settings.include_jobs = false;
        settings.include_leads = false;
        settings.include_shops = false;
        assert!(settings.includes_nothing());
    }

    #[test]
    fn test_empty_status_filter_allows_nothing() {
        let settings = SyncSettings::default();
        assert!(settings.status_filter.is_empty());
        assert!(!settings.status_allowed("active"));
        assert!(!settings.status_allowed(""));
    }

    #[test]
    fn test_status_filter_is_exact_membership() {
        let settings = SyncSettings {
            status_filter: ["active".to_owned(), "trial".to_owned()].into(),
            ..SyncSettings::default()
        };
        assert!(settings.status_allowed("active"));
        assert!(settings.status_allowed("trial"));
        assert!(!settings.status_allowed("Active"));
        assert!(!settings.status_allowed("archived"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let settings = SyncSettings {
            auto_sync: true,
            sync_interval: SyncInterval::new(15).unwrap(),
            include_jobs: true,
            include_leads: false,
            include_shops: true,
            status_filter: ["active".to_owned()].into(),
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: SyncSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
