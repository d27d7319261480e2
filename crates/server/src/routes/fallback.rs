//! Handler for requests that match no route and no static file

use axum::http::Uri;

use crate::error::AppError;

/// 404 with the requested path
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
