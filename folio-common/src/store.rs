//! JSON document store
//!
//! Every document lives in its own file under the data directory and is
//! read and rewritten as a whole. There is no locking: two writers racing on
//! the same document resolve as last-write-wins. Writes go to a sibling
//! temporary file that is renamed over the target, so a reader never sees a
//! half-written document.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{BioDocument, Lang, LocaleDocument, TracksDocument};
use crate::Result;

/// File name of the profile picture inside the images directory
pub const PROFILE_IMAGE_NAME: &str = "profile.webp";

/// Reads and writes the site's JSON documents
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn bio_path(&self) -> PathBuf {
        self.data_dir.join("bio.json")
    }

    pub fn tracks_path(&self) -> PathBuf {
        self.data_dir.join("tracks.json")
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.data_dir.join("locales")
    }

    pub fn locale_path(&self, lang: Lang) -> PathBuf {
        self.locales_dir().join(format!("{}.json", lang.code()))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    pub fn profile_image_path(&self) -> PathBuf {
        self.images_dir().join(PROFILE_IMAGE_NAME)
    }

    /// Create the data, locales and images directories if missing
    pub async fn ensure_layout(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.locales_dir()).await?;
        tokio::fs::create_dir_all(self.images_dir()).await?;
        Ok(())
    }

    /// Write `initial` to a locale file only when it does not exist yet
    pub async fn seed_locale(&self, lang: Lang, initial: &LocaleDocument) -> Result<bool> {
        if tokio::fs::try_exists(self.locale_path(lang)).await? {
            return Ok(false);
        }
        self.save_locale(lang, initial).await?;
        Ok(true)
    }

    /// Read a document; a missing file yields the type's default
    pub async fn read_json<T>(&self, path: &Path) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, using empty document", path.display());
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a document wholesale
    pub async fn write_json<T>(&self, path: &Path, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let bytes = serde_json::to_vec_pretty(value)?;

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub async fn load_bio(&self) -> Result<BioDocument> {
        self.read_json(&self.bio_path()).await
    }

    pub async fn save_bio(&self, bio: &BioDocument) -> Result<()> {
        self.write_json(&self.bio_path(), bio).await
    }

    pub async fn load_tracks(&self) -> Result<TracksDocument> {
        self.read_json(&self.tracks_path()).await
    }

    pub async fn save_tracks(&self, tracks: &TracksDocument) -> Result<()> {
        self.write_json(&self.tracks_path(), tracks).await
    }

    pub async fn load_locale(&self, lang: Lang) -> Result<LocaleDocument> {
        self.read_json(&self.locale_path(lang)).await
    }

    pub async fn save_locale(&self, lang: Lang, locale: &LocaleDocument) -> Result<()> {
        self.write_json(&self.locale_path(lang), locale).await
    }

    /// Validate operator-pasted JSON and store it as the locale document
    pub async fn save_locale_text(&self, lang: Lang, text: &str) -> Result<LocaleDocument> {
        let locale = LocaleDocument::parse(text)?;
        self.save_locale(lang, &locale).await?;
        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackRecord;
    use serde_json::json;

    async fn temp_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("data"));
        store.ensure_layout().await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_missing_documents_read_as_empty() {
        let (_dir, store) = temp_store().await;

        assert_eq!(store.load_bio().await.unwrap(), BioDocument::default());
        assert!(store.load_tracks().await.unwrap().tracks.is_empty());
        assert_eq!(
            store.load_locale(Lang::Fr).await.unwrap(),
            LocaleDocument::default()
        );
    }

    #[tokio::test]
    async fn test_tracks_rewrite_replaces_whole_document() {
        let (_dir, store) = temp_store().await;

        let mut doc = TracksDocument::default();
        doc.tracks.push(TrackRecord::new("a.mp3", "A"));
        doc.tracks.push(TrackRecord::new("b.mp3", "B"));
        store.save_tracks(&doc).await.unwrap();

        doc.tracks.remove(0);
        store.save_tracks(&doc).await.unwrap();

        let loaded = store.load_tracks().await.unwrap();
        assert_eq!(loaded.tracks, vec![TrackRecord::new("b.mp3", "B")]);
        assert!(!store.data_dir().join("tracks.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_locale_text_round_trip() {
        let (_dir, store) = temp_store().await;

        let text = r#"{ "nav": { "about": "À propos", "work": "Travaux" }, "title": "Salut" }"#;
        store.save_locale_text(Lang::Fr, text).await.unwrap();

        let loaded = store.load_locale(Lang::Fr).await.unwrap();
        assert_eq!(
            loaded.0,
            json!({ "title": "Salut", "nav": { "work": "Travaux", "about": "À propos" } })
        );
    }

    #[tokio::test]
    async fn test_invalid_locale_text_leaves_file_untouched() {
        let (_dir, store) = temp_store().await;
        store.save_locale_text(Lang::En, r#"{"a":"b"}"#).await.unwrap();

        let err = store.save_locale_text(Lang::En, "{ broken").await.unwrap_err();
        assert!(err.is_client_error());

        let loaded = store.load_locale(Lang::En).await.unwrap();
        assert_eq!(loaded.0, json!({"a": "b"}));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let (_dir, store) = temp_store().await;
        tokio::fs::write(store.bio_path(), b"not json").await.unwrap();

        assert!(matches!(store.load_bio().await, Err(crate::Error::Json(_))));
    }

    #[tokio::test]
    async fn test_seed_locale_only_when_missing() {
        let (_dir, store) = temp_store().await;
        let seed = LocaleDocument(json!({"k": "v"}));

        assert!(store.seed_locale(Lang::En, &seed).await.unwrap());
        assert!(!store
            .seed_locale(Lang::En, &LocaleDocument::default())
            .await
            .unwrap());
        assert_eq!(store.load_locale(Lang::En).await.unwrap(), seed);
    }
}
