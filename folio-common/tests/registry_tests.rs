//! Track registry workflow against a real data directory

use folio_common::filename::{resolve_track_path, sanitize_filename, title_from_filename};
use folio_common::tracks::{Direction, Registration};
use folio_common::{Error, JsonStore, TrackRecord};

async fn store() -> (tempfile::TempDir, JsonStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    store.ensure_layout().await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_upload_registration_persists_in_order() {
    let (dir, store) = store().await;
    let work_dir = dir.path().join("work");

    for original in ["Intro.mp3", "My Song.mp3", "Été.flac"] {
        let filename = sanitize_filename(original);
        resolve_track_path(&work_dir, &filename).unwrap();

        let mut tracks = store.load_tracks().await.unwrap();
        let title = title_from_filename(&filename);
        assert_eq!(
            tracks.register(TrackRecord::new(filename, title)),
            Registration::Appended
        );
        store.save_tracks(&tracks).await.unwrap();
    }

    let tracks = store.load_tracks().await.unwrap();
    let names: Vec<_> = tracks.tracks.iter().map(|t| t.filename.as_str()).collect();
    assert_eq!(names, ["Intro.mp3", "My_Song.mp3", "_t_.flac"]);
    assert_eq!(tracks.tracks[1].title, "My_Song");
    assert_eq!(tracks.tracks[1].url(), "/work/My_Song.mp3");
}

#[tokio::test]
async fn test_reorder_and_remove_round_trip_through_disk() {
    let (_dir, store) = store().await;

    let mut tracks = store.load_tracks().await.unwrap();
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        tracks.register(TrackRecord::new(name, name));
    }
    assert!(tracks.move_track("c.mp3", Direction::Up).unwrap());
    store.save_tracks(&tracks).await.unwrap();

    let mut tracks = store.load_tracks().await.unwrap();
    assert_eq!(tracks.position("c.mp3"), Some(1));
    assert!(!tracks.move_track("a.mp3", Direction::Up).unwrap());

    tracks.remove("c.mp3").unwrap();
    assert!(matches!(tracks.remove("c.mp3"), Err(Error::NotFound(_))));
    store.save_tracks(&tracks).await.unwrap();

    let names: Vec<_> = store
        .load_tracks()
        .await
        .unwrap()
        .tracks
        .into_iter()
        .map(|t| t.filename)
        .collect();
    assert_eq!(names, ["a.mp3", "b.mp3"]);
}

#[tokio::test]
async fn test_corrupt_registry_is_an_error_not_an_empty_list() {
    let (_dir, store) = store().await;
    tokio::fs::write(store.tracks_path(), b"{\"tracks\": [").await.unwrap();

    assert!(matches!(store.load_tracks().await, Err(Error::Json(_))));
}
