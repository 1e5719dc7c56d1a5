//! Domino integration management routes.
//!
//! The API key is only ever rendered masked. A manual sync trigger runs
//! the same engine as the scheduler and is refused for inactive
//! integrations.

use std::collections::BTreeSet;

use askama::Template;
use axum::{
    extract::{Form, Path, State},
    http::Uri,
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use itadaki_core::{Action, IntegrationId, Resource, SyncInterval, SyncSettings};

use crate::db::IntegrationRepository;
use crate::error::{AppError, ValidationError};
use crate::middleware::{RequireAuth, authorize};
use crate::models::DominoIntegration;
use crate::routes::render;
use crate::services::SyncService;
use crate::services::sync::SyncError;
use crate::shell::Shell;
use crate::state::AppState;

/// Integration row for the settings page.
#[derive(Debug, Clone)]
pub struct IntegrationView {
    pub id: i64,
    pub endpoint: String,
    pub masked_api_key: String,
    pub webhook_url: String,
    pub is_active: bool,
    pub auto_sync: bool,
    pub sync_interval_minutes: u32,
    pub include_jobs: bool,
    pub include_leads: bool,
    pub include_shops: bool,
    pub status_filter: String,
    pub last_sync: String,
    pub total_imports: i64,
}

impl From<&DominoIntegration> for IntegrationView {
    fn from(integration: &DominoIntegration) -> Self {
        Self {
            id: integration.id.as_i64(),
            endpoint: integration.base_url.to_string(),
            masked_api_key: integration.masked_api_key(),
            webhook_url: integration
                .webhook_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            is_active: integration.is_active,
            auto_sync: integration.sync.auto_sync,
            sync_interval_minutes: integration.sync.sync_interval.minutes(),
            include_jobs: integration.sync.include_jobs,
            include_leads: integration.sync.include_leads,
            include_shops: integration.sync.include_shops,
            status_filter: integration
                .sync
                .status_filter
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            last_sync: integration
                .last_sync_at
                .map_or_else(|| "未実行".to_owned(), |at| {
                    at.format("%Y-%m-%d %H:%M").to_string()
                }),
            total_imports: integration.total_imports,
        }
    }
}

/// Integrations page template.
#[derive(Template)]
#[template(path = "integrations.html")]
pub struct IntegrationsTemplate {
    pub shell: Shell,
    pub integrations: Vec<IntegrationView>,
}

/// Form payload for the sync settings.
#[derive(Debug, Deserialize)]
pub struct SyncSettingsForm {
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub auto_sync: Option<String>,
    pub sync_interval_minutes: String,
    #[serde(default)]
    pub include_jobs: Option<String>,
    #[serde(default)]
    pub include_leads: Option<String>,
    #[serde(default)]
    pub include_shops: Option<String>,
    /// Comma-separated status values; whitespace is trimmed, empty means
    /// import nothing.
    #[serde(default)]
    pub status_filter: String,
}

impl SyncSettingsForm {
    fn into_settings(self) -> Result<(bool, SyncSettings), ValidationError> {
        let minutes: u32 = self.sync_interval_minutes.trim().parse().map_err(|_| {
            ValidationError::new("sync_interval_minutes", "must be a positive integer")
        })?;
        let sync_interval = SyncInterval::new(minutes).map_err(|e| {
            ValidationError::new("sync_interval_minutes", e.to_string())
        })?;

        let status_filter: BTreeSet<String> = self
            .status_filter
            .split(',')
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        Ok((
            self.is_active.is_some(),
            SyncSettings {
                auto_sync: self.auto_sync.is_some(),
                sync_interval,
                include_jobs: self.include_jobs.is_some(),
                include_leads: self.include_leads.is_some(),
                include_shops: self.include_shops.is_some(),
                status_filter,
            },
        ))
    }
}

/// Integrations page.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    authorize(&user, Resource::Settings, Action::Read)?;

    let integrations = IntegrationRepository::new(state.pool()).list_all().await?;
    let template = IntegrationsTemplate {
        shell: Shell::for_path(Some(uri.path())),
        integrations: integrations.iter().map(IntegrationView::from).collect(),
    };
    Ok(render(&template))
}

/// Update an integration's sync settings.
#[instrument(skip(user, state, form))]
pub async fn update_settings(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<SyncSettingsForm>,
) -> Result<Redirect, AppError> {
    authorize(&user, Resource::Settings, Action::Update)?;

    let (is_active, settings) = form.into_settings()?;
    IntegrationRepository::new(state.pool())
        .update_settings(IntegrationId::new(id), is_active, &settings)
        .await?;
    tracing::info!(integration_id = %id, "sync settings updated");
    Ok(Redirect::to("/integrations"))
}

/// Run a sync now.
#[instrument(skip(user, state))]
pub async fn trigger_sync(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    authorize(&user, Resource::Settings, Action::Update)?;

    let integration = IntegrationRepository::new(state.pool())
        .get_by_id(IntegrationId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("integration {id}")))?;

    let service = SyncService::new(state.pool().clone());
    match service.run_integration(&integration).await {
        Ok(report) => {
            tracing::info!(
                integration_id = %report.integration_id,
                imported = report.imported,
                failed = report.failed,
                skipped = report.skipped,
                "manual sync run completed"
            );
            Ok(Redirect::to("/integrations"))
        }
        Err(SyncError::Inactive(_)) => Err(AppError::BadRequest(
            "integration is inactive; activate it before syncing".to_owned(),
        )),
        Err(SyncError::LeaseHeld(_)) => Err(AppError::BadRequest(
            "a sync run is already in flight for this integration".to_owned(),
        )),
        Err(SyncError::Database(e)) => Err(AppError::Database(e)),
        Err(SyncError::Domino(e)) => Err(AppError::Domino(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> SyncSettingsForm {
        SyncSettingsForm {
            is_active: Some("on".to_owned()),
            auto_sync: Some("on".to_owned()),
            sync_interval_minutes: "30".to_owned(),
            include_jobs: Some("on".to_owned()),
            include_leads: None,
            include_shops: None,
            status_filter: "active, trial".to_owned(),
        }
    }

    #[test]
    fn test_form_parses() {
        let (is_active, settings) = form().into_settings().unwrap();
        assert!(is_active);
        assert!(settings.auto_sync);
        assert_eq!(settings.sync_interval.minutes(), 30);
        assert!(settings.include_jobs);
        assert!(!settings.include_leads);
        assert!(settings.status_allowed("active"));
        assert!(settings.status_allowed("trial"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut bad = form();
        bad.sync_interval_minutes = "0".to_owned();
        let err = bad.into_settings().unwrap_err();
        assert_eq!(err.field, "sync_interval_minutes");
    }

    #[test]
    fn test_non_numeric_interval_rejected() {
        let mut bad = form();
        bad.sync_interval_minutes = "hourly".to_owned();
        assert!(bad.into_settings().is_err());
    }

    #[test]
    fn test_blank_filter_is_empty_set() {
        let mut empty = form();
        empty.status_filter = "  ".to_owned();
        let (_, settings) = empty.into_settings().unwrap();
        assert!(settings.status_filter.is_empty());
    }

    #[test]
    fn test_unchecked_boxes_are_false() {
        let mut bare = form();
        bare.is_active = None;
        bare.auto_sync = None;
        bare.include_jobs = None;
        let (is_active, settings) = bare.into_settings().unwrap();
        assert!(!is_active);
        assert!(!settings.auto_sync);
        assert!(settings.includes_nothing() || !settings.include_jobs);
    }
}
