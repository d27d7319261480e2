//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dashboard_core::{ErrorBody, RegistryError};

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// No route or static file matched; carries the request path
    NotFound(String),
    /// Query string or body failed to parse
    BadRequest(String),
    /// Rendering the metrics registry failed
    Metrics(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(path) => (StatusCode::NOT_FOUND, ErrorBody::not_found(&path)),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Bad Request").with_message(msg),
            ),
            AppError::Metrics(msg) => {
                tracing::error!(error = %msg, "Failed to render metrics");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Metrics Unavailable").with_message(msg),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError::Metrics(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Background task failed: {}", err))
    }
}
