//! HTTP API handlers for folio-web

pub mod admin;
pub mod auth;
pub mod contact;
pub mod health;
pub mod public;

use axum::{middleware, routing::get, routing::post, Router};

use crate::rate_limit::limit_requests;
use crate::AppState;

pub use auth::require_admin;
pub use health::health_routes;

/// Landing pages, the track list and the contact endpoint
pub fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(public::index))
        .route("/en", get(public::index_en))
        .route("/fr", get(public::index_fr))
        .route("/api/tracks", get(public::list_tracks))
        .route(
            "/api/contact",
            post(contact::submit_contact).route_layer(middleware::from_fn_with_state(
                state.contact_limiter.clone(),
                limit_requests,
            )),
        )
}
