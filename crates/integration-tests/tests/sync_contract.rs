//! Tests for the Domino sync configuration contract.
//!
//! The engine's scheduling decisions are pure functions of an
//! integration's settings and timestamps, so the contract is tested here
//! without a database: an inactive integration never runs, the interval
//! gates re-runs, and the empty status filter imports nothing.

use chrono::{Duration, Utc};
use rand::Rng;
use secrecy::SecretString;
use url::Url;

use itadaki_core::{IntegrationId, SyncInterval, SyncSettings};
use itadaki_web::models::DominoIntegration;

#[allow(clippy::unwrap_used)]
fn integration(settings: SyncSettings) -> DominoIntegration {
    DominoIntegration {
        id: IntegrationId::new(1),
        api_key: SecretString::from("dk_live_0123456789"),
        base_url: Url::parse("https://api.domino.example/").unwrap(),
        webhook_url: None,
        is_active: true,
        sync: settings,
        last_sync_at: None,
        last_attempted_at: None,
        total_imports: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[allow(clippy::unwrap_used)]
fn auto_settings(minutes: u32) -> SyncSettings {
    SyncSettings {
        auto_sync: true,
        sync_interval: SyncInterval::new(minutes).unwrap(),
        ..SyncSettings::default()
    }
}

// =============================================================================
// isActive gating
// =============================================================================

/// Property: for `is_active = false`, no run is ever due, whatever the
/// rest of the configuration looks like.
#[test]
fn test_inactive_never_due_over_random_configurations() {
    let mut rng = rand::rng();
    let now = Utc::now();

    for _ in 0..2_000 {
        #[allow(clippy::unwrap_used)]
        let settings = SyncSettings {
            auto_sync: rng.random(),
            sync_interval: SyncInterval::new(rng.random_range(1..=100_000)).unwrap(),
            include_jobs: rng.random(),
            include_leads: rng.random(),
            include_shops: rng.random(),
            status_filter: if rng.random() {
                ["active".to_owned()].into()
            } else {
                std::collections::BTreeSet::new()
            },
        };
        let mut integration = integration(settings);
        integration.is_active = false;
        integration.last_sync_at = rng
            .random::<bool>()
            .then(|| now - Duration::minutes(rng.random_range(0..1_000_000)));
        integration.last_attempted_at = rng
            .random::<bool>()
            .then(|| now - Duration::minutes(rng.random_range(0..1_000_000)));

        assert!(
            !integration.sync_due(now),
            "inactive integration must never be due: {integration:?}"
        );
    }
}

#[test]
fn test_auto_sync_off_never_due() {
    let mut settings = auto_settings(5);
    settings.auto_sync = false;
    assert!(!integration(settings).sync_due(Utc::now()));
}

// =============================================================================
// Interval gating
// =============================================================================

#[test]
fn test_first_run_is_due_immediately() {
    assert!(integration(auto_settings(60)).sync_due(Utc::now()));
}

#[test]
fn test_run_not_due_until_interval_elapses() {
    let now = Utc::now();
    let mut subject = integration(auto_settings(60));

    subject.last_sync_at = Some(now - Duration::minutes(59));
    assert!(!subject.sync_due(now));

    subject.last_sync_at = Some(now - Duration::minutes(60));
    assert!(subject.sync_due(now));
}

#[test]
fn test_failed_attempt_counts_toward_interval() {
    // A run that failed (attempted but never completed) must not be
    // retried immediately; the attempt timestamp gates the next try.
    let now = Utc::now();
    let mut subject = integration(auto_settings(60));
    subject.last_sync_at = Some(now - Duration::hours(48));
    subject.last_attempted_at = Some(now - Duration::minutes(5));
    assert!(!subject.sync_due(now));

    subject.last_attempted_at = Some(now - Duration::minutes(61));
    assert!(subject.sync_due(now));
}

// =============================================================================
// Inclusion predicate
// =============================================================================

#[test]
fn test_empty_status_filter_allows_no_record() {
    let settings = auto_settings(60);
    assert!(settings.status_filter.is_empty());
    for status in ["active", "archived", "", "anything"] {
        assert!(
            !settings.status_allowed(status),
            "empty filter must import nothing, allowed {status:?}"
        );
    }
}

#[test]
fn test_status_filter_is_exact_match() {
    let mut settings = auto_settings(60);
    settings.status_filter = ["active".to_owned()].into();
    assert!(settings.status_allowed("active"));
    assert!(!settings.status_allowed("Active"));
    assert!(!settings.status_allowed("inactive"));
}

#[test]
fn test_includes_nothing_when_all_flags_off() {
    let mut settings = auto_settings(60);
    settings.include_jobs = false;
    settings.include_leads = false;
    settings.include_shops = false;
    assert!(settings.includes_nothing());

    settings.include_leads = true;
    assert!(!settings.includes_nothing());
}

#[test]
fn test_interval_rejects_zero_minutes() {
    assert!(SyncInterval::new(0).is_err());
}
