//! Track catalog: the work directory plus its ordered registry
//!
//! All registry mutations go through [`TrackCatalog`], which serializes them,
//! persists `tracks.json` and then notifies the [`TrackListener`].

use folio_common::filename::{resolve_track_path, sanitize_filename, title_from_filename};
use folio_common::tracks::{normalize_title, Direction, Registration};
use folio_common::{Error, JsonStore, Result, TrackRecord, TracksDocument};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::content::TrackListener;

/// Where an upload will be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub filename: String,
    pub path: PathBuf,
}

pub struct TrackCatalog {
    store: JsonStore,
    work_dir: PathBuf,
    listener: Arc<dyn TrackListener>,
    /// Held across load-modify-save of `tracks.json`
    registry_lock: Mutex<()>,
}

impl TrackCatalog {
    pub fn new(store: JsonStore, work_dir: impl Into<PathBuf>, listener: Arc<dyn TrackListener>) -> Self {
        Self {
            store,
            work_dir: work_dir.into(),
            listener,
            registry_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<TracksDocument> {
        self.store.load_tracks().await
    }

    /// Sanitize a client-supplied file name and place it in the work directory
    pub fn upload_target(&self, original_name: &str) -> Result<UploadTarget> {
        let filename = sanitize_filename(original_name);
        let path = resolve_track_path(&self.work_dir, &filename)
            .map_err(|_| Error::InvalidInput("Invalid file name".to_string()))?;
        Ok(UploadTarget { filename, path })
    }

    /// Add a stored upload to the registry
    ///
    /// An empty or missing title falls back to the file name without its
    /// extension.
    pub async fn register_upload(&self, filename: &str, title: Option<&str>) -> Result<Registration> {
        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => normalize_title(title)?,
            None => title_from_filename(filename),
        };

        let _guard = self.registry_lock.lock().await;
        let mut tracks = self.store.load_tracks().await?;
        let registration = tracks.register(TrackRecord::new(filename, title));
        self.commit(&tracks).await?;

        info!("Track {} uploaded ({:?})", filename, registration);
        Ok(registration)
    }

    /// Remove a track from the registry, then its file
    ///
    /// A file that is already gone is not an error.
    pub async fn delete(&self, filename: &str) -> Result<TrackRecord> {
        let path = resolve_track_path(&self.work_dir, filename)?;

        let removed = {
            let _guard = self.registry_lock.lock().await;
            let mut tracks = self.store.load_tracks().await?;
            let removed = tracks.remove(filename)?;
            self.commit(&tracks).await?;
            removed
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Track file {} was already missing", path.display());
            }
            Err(e) => warn!("Track {} unregistered but file not removed: {}", filename, e),
        }

        info!("Track {} deleted", filename);
        Ok(removed)
    }

    pub async fn rename(&self, filename: &str, title: &str) -> Result<()> {
        resolve_track_path(&self.work_dir, filename)?;
        let title = normalize_title(title)?;

        let _guard = self.registry_lock.lock().await;
        let mut tracks = self.store.load_tracks().await?;
        tracks.rename(filename, &title)?;
        self.commit(&tracks).await?;

        info!("Track {} renamed to '{}'", filename, title);
        Ok(())
    }

    /// Move a track one step; returns `false` at either end of the list
    pub async fn reorder(&self, filename: &str, direction: &str) -> Result<bool> {
        resolve_track_path(&self.work_dir, filename)?;
        let direction: Direction = direction.parse()?;

        let _guard = self.registry_lock.lock().await;
        let mut tracks = self.store.load_tracks().await?;
        let moved = tracks.move_track(filename, direction)?;
        if moved {
            self.commit(&tracks).await?;
        }
        Ok(moved)
    }

    async fn commit(&self, tracks: &TracksDocument) -> Result<()> {
        self.store.save_tracks(tracks).await?;
        self.listener.tracks_changed(tracks);
        Ok(())
    }
}
