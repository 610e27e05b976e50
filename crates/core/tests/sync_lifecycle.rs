//! End-to-end lifecycle test: build a library through the store API,
//! sync it against a mock remote store, and verify the persisted
//! result.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use medialib_core::testing::MockRemoteStore;
use medialib_core::{
    AddOutcome, Library, NewVideo, RemoteStore, SyncEngine, SyncOptions,
};

fn new_video(url: &str, id: &str, title: &str, file: Option<&str>) -> NewVideo {
    NewVideo {
        url: url.to_string(),
        video_id: id.to_string(),
        title: title.to_string(),
        file_path: file.map(|f| f.to_string()),
        ..NewVideo::default()
    }
}

#[tokio::test]
async fn test_full_lifecycle() {
    let temp = TempDir::new().unwrap();
    let library_path = temp.path().join("library.json");

    // The acquisition side: add entries, with duplicate detection.
    let mut library = Library::open(&library_path);
    fs::write(temp.path().join("first.mp4"), b"aaaa").unwrap();
    fs::write(temp.path().join("second.mp4"), b"bbbb").unwrap();

    assert_eq!(
        library
            .add(new_video(
                "https://example.com/v/1",
                "1",
                "First",
                Some("first.mp4")
            ))
            .unwrap(),
        AddOutcome::Added
    );
    assert_eq!(
        library
            .add(new_video(
                "https://example.com/v/2",
                "2",
                "Second",
                Some("second.mp4")
            ))
            .unwrap(),
        AddOutcome::Added
    );
    // Re-download attempt of the same url is rejected.
    assert_eq!(
        library
            .add(new_video("https://example.com/v/1", "99", "Copy", None))
            .unwrap(),
        AddOutcome::Duplicate
    );
    drop(library);

    // The sync side: upload both entries.
    let remote = Arc::new(MockRemoteStore::new());
    let engine = SyncEngine::new(
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        SyncOptions {
            workers: 2,
            ..SyncOptions::default()
        },
    );

    let report = engine.run(&library_path).await.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.uploaded, 2);
    assert!(report.is_clean());

    let puts = remote.recorded_puts().await;
    let mut keys: Vec<_> = puts.iter().map(|p| p.key.clone()).collect();
    keys.sort();
    assert_eq!(keys, vec!["first.mp4".to_string(), "second.mp4".to_string()]);
    assert!(puts.iter().all(|p| p.content_type == "video/mp4"));

    // Reload from disk: locators and sync stamp survived.
    let library = Library::open(&library_path);
    assert_eq!(
        library.get("1").unwrap().remote_url.as_deref(),
        Some("https://pub-test.r2.dev/first.mp4")
    );
    assert_eq!(
        library.get("2").unwrap().remote_url.as_deref(),
        Some("https://pub-test.r2.dev/second.mp4")
    );
    assert!(library.last_sync().is_some());

    // A second pass has nothing left to do.
    let report = engine.run(&library_path).await.unwrap();
    assert_eq!(report.uploaded, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(remote.put_count().await, 2);

    let stats = library.stats();
    assert_eq!(stats.total_videos, 2);
}
