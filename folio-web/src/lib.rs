//! folio-web library - bilingual portfolio site with an admin panel
//!
//! Public pages render the bio, the "work" track list and a contact form in
//! English or French. Everything under `/admin` sits behind HTTP Basic auth
//! and edits the JSON documents in the data directory.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use folio_common::{JsonStore, Lang, LocaleDocument};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

pub mod api;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod mail;
pub mod rate_limit;
pub mod render;
pub mod upload;

use catalog::TrackCatalog;
use config::SiteConfig;
use content::ContentCache;
use mail::Mailer;
use rate_limit::{ClientRateLimiter, Rejection};

const SEED_LOCALE_EN: &str = include_str!("../locales/en.json");
const SEED_LOCALE_FR: &str = include_str!("../locales/fr.json");

/// How often idle rate-limit entries are purged
const LIMITER_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(300);

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub store: JsonStore,
    /// Bio, translations and the public track list
    pub content: Arc<ContentCache>,
    pub catalog: Arc<TrackCatalog>,
    pub mailer: Arc<dyn Mailer>,
    pub admin_limiter: Arc<ClientRateLimiter>,
    pub contact_limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Prepare the data directory and load the initial content
    ///
    /// Missing locale files are seeded from the bundled dictionaries; existing
    /// ones are never overwritten.
    pub async fn initialize(config: SiteConfig, mailer: Arc<dyn Mailer>) -> folio_common::Result<Self> {
        let store = JsonStore::new(&config.data_dir);
        store.ensure_layout().await?;
        tokio::fs::create_dir_all(&config.work_dir).await?;

        for (lang, seed) in [(Lang::En, SEED_LOCALE_EN), (Lang::Fr, SEED_LOCALE_FR)] {
            if store.seed_locale(lang, &LocaleDocument::parse(seed)?).await? {
                info!("Seeded {} translations at {}", lang, store.locale_path(lang).display());
            }
        }

        let content = Arc::new(ContentCache::load(store.clone()).await?);
        let catalog = Arc::new(TrackCatalog::new(
            store.clone(),
            config.work_dir.clone(),
            content.clone(),
        ));
        let admin_limiter = Arc::new(ClientRateLimiter::new(
            "admin",
            config.admin_rate_limit,
            Rejection::Text,
        )?);
        let contact_limiter = Arc::new(ClientRateLimiter::new(
            "contact",
            config.contact_rate_limit,
            Rejection::Json,
        )?);

        Ok(Self {
            config: Arc::new(config),
            store,
            content,
            catalog,
            mailer,
            admin_limiter,
            contact_limiter,
        })
    }

    /// Periodically drop rate-limit state for clients that went quiet
    pub fn spawn_limiter_maintenance(&self) -> tokio::task::JoinHandle<()> {
        let limiters = [self.admin_limiter.clone(), self.contact_limiter.clone()];
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LIMITER_MAINTENANCE_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                for limiter in &limiters {
                    limiter.retain_recent();
                }
            }
        })
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        json!({"success": false, "error": "Internal server error"}).to_string(),
    )
        .into_response()
}

/// Build application router
///
/// Admin routes are rate limited first, then authenticated. Uploaded tracks
/// and the profile photo are served from the data directory; any other path
/// falls through to the static asset directory when one is configured.
pub fn build_router(state: AppState) -> Router {
    let work_files = ServeDir::new(&state.config.work_dir);
    let image_files = ServeDir::new(state.config.images_dir());
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .merge(api::public_routes(&state))
        .merge(api::admin::admin_routes(&state))
        .merge(api::health_routes())
        .nest_service("/work", work_files)
        .nest_service("/images", image_files);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}
