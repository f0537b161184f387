//! Basic-Auth gate for the admin panel
//!
//! Applied with `route_layer`, so only matched admin routes are challenged
//! and unknown paths still fall through to 404 / static files.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use folio_common::auth::BasicAuthError;
use tracing::{debug, error, warn};

use crate::config::ADMIN_PASSWORD_ENV;
use crate::AppState;

const CHALLENGE: &str = "Basic realm=\"Admin\"";

/// Authentication middleware
///
/// Returns 500 when no admin password is configured and 401 with a Basic
/// challenge when credentials are missing, malformed or wrong.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AdminAuthError> {
    let Some(admin) = state.config.admin.as_ref() else {
        error!(
            "{} is not set - refusing {} {}",
            ADMIN_PASSWORD_ENV,
            request.method(),
            request.uri().path()
        );
        return Err(AdminAuthError::NotConfigured);
    };

    let authorization = match request.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| {
            AdminAuthError::Rejected(BasicAuthError::Malformed(
                "header is not valid ASCII".to_string(),
            ))
        })?),
    };

    if let Err(e) = admin.authenticate(authorization) {
        match &e {
            BasicAuthError::InvalidCredentials => warn!(
                "Admin login failed for {} {}",
                request.method(),
                request.uri().path()
            ),
            other => debug!("Admin challenge issued: {}", other),
        }
        return Err(AdminAuthError::Rejected(e));
    }

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AdminAuthError {
    /// ADMIN_PASSWORD missing from the environment
    NotConfigured,
    Rejected(BasicAuthError),
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        match self {
            AdminAuthError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Admin authentication is not configured",
            )
                .into_response(),
            AdminAuthError::Rejected(e) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, CHALLENGE)],
                e.to_string(),
            )
                .into_response(),
        }
    }
}
