//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, http::Uri, response::Html};
use tracing::instrument;

use crate::db::{ImportRepository, IntegrationRepository, StoreRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::DominoIntegration;
use crate::routes::render;
use crate::shell::Shell;
use crate::state::AppState;

/// Headline counts.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub open_stores: i64,
    pub active_users: i64,
    pub imported_jobs: i64,
    pub imported_leads: i64,
    pub imported_shops: i64,
}

/// Integration summary row for the dashboard.
#[derive(Debug, Clone)]
pub struct IntegrationView {
    pub endpoint: String,
    pub state: String,
    pub last_sync: String,
    pub total_imports: i64,
}

impl From<&DominoIntegration> for IntegrationView {
    fn from(integration: &DominoIntegration) -> Self {
        let state = if !integration.is_active {
            "停止中"
        } else if integration.sync.auto_sync {
            "自動同期"
        } else {
            "手動のみ"
        };
        Self {
            endpoint: integration.base_url.to_string(),
            state: state.to_owned(),
            last_sync: integration
                .last_sync_at
                .map_or_else(|| "未実行".to_owned(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
            total_imports: integration.total_imports,
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub shell: Shell,
    pub user_name: String,
    pub metrics: DashboardMetrics,
    pub integrations: Vec<IntegrationView>,
}

/// Dashboard page handler.
#[instrument(skip(user, state))]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, AppError> {
    let stores = StoreRepository::new(state.pool());
    let users = UserRepository::new(state.pool());
    let imports = ImportRepository::new(state.pool());
    let integrations_repo = IntegrationRepository::new(state.pool());

    let (open_stores, active_users, imported_jobs, imported_leads, imported_shops, integrations) =
        tokio::try_join!(
            stores.count_open(),
            users.count_active(),
            imports.count_jobs(),
            imports.count_leads(),
            imports.count_shops(),
            integrations_repo.list_all(),
        )?;

    let template = DashboardTemplate {
        shell: Shell::for_path(Some(uri.path())),
        user_name: user.name,
        metrics: DashboardMetrics {
            open_stores,
            active_users,
            imported_jobs,
            imported_leads,
            imported_shops,
        },
        integrations: integrations.iter().map(IntegrationView::from).collect(),
    };

    Ok(render(&template))
}
