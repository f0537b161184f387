//! In-memory view of the site content used by the public pages
//!
//! Bio and locale documents are re-read by [`ContentCache::reload`] at the
//! start of every public request, so edits made through the admin panel (or
//! directly on disk) show up without a restart. Handlers then take one
//! [`ContentCache::get`] snapshot and render from it; the snapshot never
//! changes underneath a request.
//!
//! The track list is not re-read per request. It is loaded at startup and
//! replaced whenever the admin side reports a change through
//! [`TrackListener`].

use folio_common::{BioDocument, JsonStore, Lang, LocaleDocument, Result, TrackRecord, TracksDocument};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Bio and translations as read at the start of a request
#[derive(Debug, Clone, Default)]
pub struct SiteContent {
    pub bio: BioDocument,
    pub en: LocaleDocument,
    pub fr: LocaleDocument,
}

impl SiteContent {
    pub fn locale(&self, lang: Lang) -> &LocaleDocument {
        match lang {
            Lang::En => &self.en,
            Lang::Fr => &self.fr,
        }
    }

    /// Translate `key`, returning the key itself when missing
    pub fn t(&self, lang: Lang, key: &str) -> String {
        folio_common::i18n::translate(self.locale(lang), key)
    }
}

/// A track as exposed to the public page and the waveform player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackView {
    pub url: String,
    pub title: String,
}

impl From<&TrackRecord> for TrackView {
    fn from(record: &TrackRecord) -> Self {
        Self {
            url: record.url(),
            title: record.title.clone(),
        }
    }
}

/// Receives the new track list after every successful admin mutation
pub trait TrackListener: Send + Sync {
    fn tracks_changed(&self, tracks: &TracksDocument);
}

/// Content snapshots shared by all public handlers
pub struct ContentCache {
    store: JsonStore,
    content: RwLock<Arc<SiteContent>>,
    tracks: RwLock<Arc<Vec<TrackView>>>,
}

impl ContentCache {
    /// Read every document once
    pub async fn load(store: JsonStore) -> Result<Self> {
        let content = Self::read_content(&store).await?;
        let tracks = store.load_tracks().await?;
        Ok(Self {
            store,
            content: RwLock::new(Arc::new(content)),
            tracks: RwLock::new(Arc::new(Self::views(&tracks))),
        })
    }

    async fn read_content(store: &JsonStore) -> Result<SiteContent> {
        Ok(SiteContent {
            bio: store.load_bio().await?,
            en: store.load_locale(Lang::En).await?,
            fr: store.load_locale(Lang::Fr).await?,
        })
    }

    fn views(tracks: &TracksDocument) -> Vec<TrackView> {
        tracks.tracks.iter().map(TrackView::from).collect()
    }

    /// Re-read bio and locale documents from disk
    pub async fn reload(&self) -> Result<()> {
        let fresh = Arc::new(Self::read_content(&self.store).await?);
        *self
            .content
            .write()
            .unwrap_or_else(PoisonError::into_inner) = fresh;
        Ok(())
    }

    /// Current bio/locale snapshot
    pub fn get(&self) -> Arc<SiteContent> {
        self.content
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current track list in display order
    pub fn tracks(&self) -> Arc<Vec<TrackView>> {
        self.tracks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TrackListener for ContentCache {
    fn tracks_changed(&self, tracks: &TracksDocument) {
        debug!("Track cache refreshed ({} tracks)", tracks.tracks.len());
        *self
            .tracks
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(Self::views(tracks));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_snapshot_is_stable_until_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.ensure_layout().await.unwrap();
        store
            .save_locale(Lang::En, &LocaleDocument(json!({"hello": "Hello"})))
            .await
            .unwrap();

        let cache = ContentCache::load(store.clone()).await.unwrap();
        let before = cache.get();

        store
            .save_locale(Lang::En, &LocaleDocument(json!({"hello": "Hi"})))
            .await
            .unwrap();
        assert_eq!(before.t(Lang::En, "hello"), "Hello");
        assert_eq!(cache.get().t(Lang::En, "hello"), "Hello");

        cache.reload().await.unwrap();
        assert_eq!(cache.get().t(Lang::En, "hello"), "Hi");
        assert_eq!(before.t(Lang::En, "hello"), "Hello");
    }

    #[tokio::test]
    async fn test_listener_replaces_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ContentCache::load(JsonStore::new(dir.path())).await.unwrap();
        assert!(cache.tracks().is_empty());

        let doc = TracksDocument {
            tracks: vec![TrackRecord::new("My_Song.mp3", "My_Song")],
        };
        cache.tracks_changed(&doc);

        assert_eq!(
            cache.tracks().as_slice(),
            &[TrackView {
                url: "/work/My_Song.mp3".to_string(),
                title: "My_Song".to_string()
            }]
        );
    }
}
