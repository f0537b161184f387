//! Public landing pages and the track list

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
    Json,
};
use folio_common::{i18n::negotiate_language, Lang};
use std::sync::Arc;
use tracing::warn;

use crate::content::{SiteContent, TrackView};
use crate::render;
use crate::AppState;

/// Fresh bio and translations for this request
///
/// A document that fails to load (for example a locale file edited by hand
/// into invalid JSON) leaves the previous snapshot in place.
async fn current_content(state: &AppState) -> Arc<SiteContent> {
    if let Err(e) = state.content.reload().await {
        warn!("Content reload failed, serving previous snapshot: {}", e);
    }
    state.content.get()
}

async fn render_landing(state: &AppState, lang: Lang) -> Html<String> {
    let content = current_content(state).await;
    let tracks = state.content.tracks();
    Html(render::landing_page(&content, &tracks, lang))
}

/// GET /
///
/// Language is negotiated from `Accept-Language`, defaulting to English.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());
    render_landing(&state, negotiate_language(accept)).await
}

/// GET /en
pub async fn index_en(State(state): State<AppState>) -> Html<String> {
    render_landing(&state, Lang::En).await
}

/// GET /fr
pub async fn index_fr(State(state): State<AppState>) -> Html<String> {
    render_landing(&state, Lang::Fr).await
}

/// GET /api/tracks
pub async fn list_tracks(State(state): State<AppState>) -> Json<Vec<TrackView>> {
    Json(state.content.tracks().as_ref().clone())
}
