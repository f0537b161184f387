//! Admin panel routes
//!
//! Pages are plain HTML forms. Every POST answers with a 303 back to the
//! page it came from, carrying the outcome as `?message=` or `?error=`.

pub mod about;
pub mod translations;
pub mod work;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::error;

use crate::api::auth::require_admin;
use crate::rate_limit::limit_requests;
use crate::render::Flash;
use crate::upload::{body_limit, AUDIO_UPLOAD, IMAGE_UPLOAD};
use crate::AppState;

/// `?message=` / `?error=` left by the previous redirect
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FlashQuery {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl From<FlashQuery> for Flash {
    fn from(query: FlashQuery) -> Self {
        Flash {
            message: query.message.filter(|m| !m.is_empty()),
            error: query.error.filter(|e| !e.is_empty()),
        }
    }
}

/// Outcome of an admin form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Message(String),
    Error(String),
}

impl Notice {
    /// Client mistakes are shown verbatim; server faults are logged
    pub fn from_error(action: &str, err: &folio_common::Error) -> Self {
        if err.is_client_error() {
            Notice::Error(err.to_string())
        } else {
            error!("{} failed: {}", action, err);
            Notice::Error(format!("{} failed: {}", action, err))
        }
    }

    pub fn from_result(action: &str, result: folio_common::Result<String>) -> Self {
        match result {
            Ok(message) => Notice::Message(message),
            Err(e) => Notice::from_error(action, &e),
        }
    }
}

/// 303 back to `path` with the notice in the query string
pub fn redirect_with(path: &str, notice: Notice) -> Redirect {
    let (key, text) = match &notice {
        Notice::Message(text) => ("message", text.as_str()),
        Notice::Error(text) => ("error", text.as_str()),
    };
    match serde_urlencoded::to_string(&[(key, text)][..]) {
        Ok(query) => Redirect::to(&format!("{}?{}", path, query)),
        Err(_) => Redirect::to(path),
    }
}

/// Build admin routes, rate limited and then authenticated
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(|| async { Redirect::to("/admin/about") }))
        .route("/admin/about", get(about::about_page))
        .route("/admin/about/bio", post(about::save_bio))
        .route(
            "/admin/about/photo",
            post(about::upload_photo).layer(DefaultBodyLimit::max(body_limit(&IMAGE_UPLOAD))),
        )
        .route("/admin/work", get(work::work_page))
        .route(
            "/admin/work/upload",
            post(work::upload_track).layer(DefaultBodyLimit::max(body_limit(&AUDIO_UPLOAD))),
        )
        .route("/admin/work/delete", post(work::delete_track))
        .route("/admin/work/update", post(work::update_track))
        .route("/admin/work/reorder", post(work::reorder_track))
        .route(
            "/admin/translations",
            get(translations::translations_page).post(translations::save_translations),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.admin_limiter.clone(),
            limit_requests,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_redirect_encodes_notice() {
        let response =
            redirect_with("/admin/work", Notice::Error("Track not found & more".into()))
                .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()["location"],
            "/admin/work?error=Track+not+found+%26+more"
        );
    }

    #[test]
    fn test_client_errors_are_shown_verbatim() {
        let notice = Notice::from_error(
            "Delete",
            &folio_common::Error::NotFound("Track not found".into()),
        );
        assert_eq!(notice, Notice::Error("Track not found".into()));
    }

    #[test]
    fn test_empty_flash_values_are_ignored() {
        let flash: Flash = FlashQuery {
            message: Some(String::new()),
            error: Some("Oops".into()),
        }
        .into();
        assert_eq!(flash.message, None);
        assert_eq!(flash.error.as_deref(), Some("Oops"));
    }
}
