//! Authentication extractors and authorization helper.
//!
//! The signed-in user is an explicit [`CurrentUser`] value read from the
//! session, extracted where a handler needs it.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use itadaki_core::{Action, Resource};

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a signed-in user.
///
/// HTML requests are redirected to the login page; `/api` requests get
/// 401 Unauthorized.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/api/") {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject the request when nobody is
/// signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Check that the user may perform `action` on `resource`.
///
/// Authorization derives from the permission set only; the role is never
/// consulted.
///
/// # Errors
///
/// Returns `AppError::Forbidden` naming the denied action.
pub fn authorize(user: &CurrentUser, resource: Resource, action: Action) -> Result<(), AppError> {
    if user.permissions.allows(resource, action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{action} on {resource} is not permitted"
        )))
    }
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Clear the signed-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use itadaki_core::{Email, Permission, PermissionSet, UserId, UserRole};

    use super::*;

    #[allow(clippy::unwrap_used)]
    fn user_with(permissions: PermissionSet) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            email: Email::parse("taro@itadaki.jp").unwrap(),
            name: "山田太郎".to_owned(),
            role: UserRole::Recruiter,
            permissions,
        }
    }

    #[test]
    fn test_authorize_denies_missing_action() {
        let mut permissions = PermissionSet::new();
        permissions.grant(Permission::new(Resource::Jobs, [Action::Read]));
        let user = user_with(permissions);

        assert!(authorize(&user, Resource::Jobs, Action::Read).is_ok());
        assert!(matches!(
            authorize(&user, Resource::Jobs, Action::Update),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_authorize_ignores_role() {
        // An admin-roled user with no permissions is still denied.
        let mut user = user_with(PermissionSet::new());
        user.role = UserRole::Admin;
        assert!(authorize(&user, Resource::Settings, Action::Read).is_err());
    }
}
