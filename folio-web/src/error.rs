//! Error types for folio-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type for JSON endpoints and page rendering
///
/// Every variant renders as `{"success": false, "error": "..."}` so the
/// contact form script can show the message directly.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Client exceeded its request allowance (429)
    #[error("Too many requests, please try again later.")]
    TooManyRequests,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// folio-common error
    #[error(transparent)]
    Common(#[from] folio_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Common(folio_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(folio_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the log
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
