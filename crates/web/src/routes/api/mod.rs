//! JSON API routes.
//!
//! Everything under `/api` answers errors as JSON: `{"error": "<summary>"}`
//! with the status taken from the underlying [`AppError`].

pub mod env_check;

use axum::{
    Json,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// An [`AppError`] rendered in the `/api` JSON error shape.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = self.0.into_response();
        let status = response.status();
        let message = if status.is_server_error() {
            "internal server error".to_owned()
        } else {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_lowercase()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
