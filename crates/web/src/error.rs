//! Unified error handling for the web application.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::domino::DominoError;
use crate::services::auth::AuthError;

/// A domain validation failure: which field, which constraint.
///
/// Mutation paths parse enumerated fields against their closed sets and
/// surface the first violation here; values are never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on '{field}': {constraint}")]
pub struct ValidationError {
    /// The offending field, as named in the submitted form.
    pub field: &'static str,
    /// The violated constraint, in human-readable form.
    pub constraint: String,
}

impl ValidationError {
    /// Build a validation error for a field.
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Domino API operation failed.
    #[error("Domino error: {0}")]
    Domino(#[from] DominoError),

    /// A mutation payload failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured => {
                Self::BadRequest("login is not configured on this deployment".to_owned())
            }
            AuthError::AssertionRejected | AuthError::UnknownUser => {
                Self::Unauthorized("sign-in was refused".to_owned())
            }
            AuthError::Provider(message) => Self::Internal(message),
            AuthError::Database(err) => Self::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Internal(_) | Self::Domino(_))
            || matches!(self, Self::Database(ref err) if !matches!(err, RepositoryError::NotFound))
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Domino(_) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(RepositoryError::Conflict(reason)) => format!("Conflict: {reason}"),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Domino(_) => "External service error".to_owned(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("store 9".to_owned());
        assert_eq!(err.to_string(), "Not found: store 9");

        let err = AppError::from(ValidationError::new(
            "business_type",
            "invalid business type: izakaya",
        ));
        assert_eq!(
            err.to_string(),
            "validation failed on 'business_type': invalid business type: izakaya"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("x".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Forbidden("x".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::BadRequest("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Validation(ValidationError::new("role", "bad"))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            status_of(AppError::from(AuthError::AssertionRejected)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::from(AuthError::UnknownUser)),
            StatusCode::UNAUTHORIZED
        );
    }
}
