//! Sign-in and sign-out routes.

use askama::Template;
use axum::{
    Extension,
    extract::{Form, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::routes::render;
use crate::services;
use crate::shell::Shell;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
}

/// Login form: the identity assertion issued by the external provider.
#[derive(Deserialize)]
pub struct LoginForm {
    pub assertion: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("assertion", &"[REDACTED]")
            .finish()
    }
}

/// Login page. A signed-in user is sent straight to the dashboard.
pub async fn login_page(OptionalAuth(user): OptionalAuth, uri: Uri) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    render(&LoginTemplate {
        shell: Shell::for_path(Some(uri.path())),
    })
    .into_response()
}

/// Verify the assertion and establish the session.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let assertion = SecretString::from(form.assertion);
    let current = services::auth::login(state.pool(), state.identity(), &assertion).await?;

    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;

    Ok(Redirect::to("/"))
}

/// Clear the session.
#[instrument(skip_all)]
pub async fn logout(Extension(session): Extension<Session>) -> Result<Redirect, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    Ok(Redirect::to("/auth/login"))
}
