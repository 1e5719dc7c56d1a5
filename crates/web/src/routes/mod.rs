//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Public section (public shell, no auth)
//! GET  /public/jobs                    - Published job listings
//! GET  /public/jobs/{id}               - Job detail
//!
//! # Admin section (authenticated shell, session auth)
//! GET  /                               - Dashboard overview
//! GET  /stores                         - Store listing
//! POST /stores                         - Create store
//! GET  /stores/{id}                    - Store edit page
//! POST /stores/{id}                    - Update store
//! POST /stores/{id}/close              - Close store (never deleted)
//! GET  /users                          - User listing
//! POST /users                          - Create user
//! GET  /users/{id}                     - User edit page
//! POST /users/{id}                     - Update user
//! POST /users/{id}/permissions         - Grant permission (replaces entry)
//! GET  /integrations                   - Domino integrations
//! POST /integrations/{id}/settings     - Update sync settings
//! POST /integrations/{id}/sync         - Trigger a run now
//!
//! # Auth
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Verify assertion, establish session
//! POST /auth/logout                    - Logout
//!
//! # Misc
//! GET  /admin                          - 307 redirect to /
//! GET  /api/env-check                  - Configuration diagnostics (JSON)
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod integrations;
pub mod public;
pub mod stores;
pub mod users;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::{get, post},
};

use crate::state::AppState;

/// Render a template into a response, logging render failures.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {e}");
        "Internal Server Error".to_owned()
    }))
}

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Public section
        .route("/public/jobs", get(public::jobs_index))
        .route("/public/jobs/{id}", get(public::job_detail))
        // Dashboard
        .route("/", get(dashboard::index))
        // Stores
        .route("/stores", get(stores::index).post(stores::create))
        .route("/stores/{id}", get(stores::edit).post(stores::update))
        .route("/stores/{id}/close", post(stores::close))
        // Users
        .route("/users", get(users::index).post(users::create))
        .route("/users/{id}", get(users::edit).post(users::update))
        .route("/users/{id}/permissions", post(users::grant_permission))
        // Domino integrations
        .route("/integrations", get(integrations::index))
        .route(
            "/integrations/{id}/settings",
            post(integrations::update_settings),
        )
        .route("/integrations/{id}/sync", post(integrations::trigger_sync))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // The old panel root; temporary so clients never cache it
        .route("/admin", get(admin_redirect))
        // Diagnostics
        .route("/api/env-check", get(api::env_check::env_check))
}

async fn admin_redirect() -> Redirect {
    Redirect::temporary("/")
}
