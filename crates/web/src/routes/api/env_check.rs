//! Configuration diagnostics endpoint.

use axum::{Json, extract::State};
use tracing::instrument;

use super::ApiError;
use crate::config::EnvDiagnostics;
use crate::state::AppState;

/// `GET /api/env-check`
///
/// Read-only, idempotent snapshot of the Domino configuration, split into
/// the `server` and `client` trust groupings. Secrets are masked to an
/// 8-character prefix; unconfigured values render as a placeholder. Always
/// 200 on success; internal failures answer 500 with `{"error": ...}`.
#[instrument(skip(state))]
pub async fn env_check(State(state): State<AppState>) -> Result<Json<EnvDiagnostics>, ApiError> {
    Ok(Json(state.config().diagnostics()))
}
