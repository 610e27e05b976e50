//! Testing utilities and mock implementations.
//!
//! Provides a mock remote store so sync behavior can be tested without
//! real object-store infrastructure, plus fixtures for building
//! library entries.

mod mock_remote_store;

pub use mock_remote_store::{MockRemoteStore, RecordedPut};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::library::VideoEntry;

    /// Create a test video entry with reasonable defaults.
    ///
    /// The title is derived from the url so failure reports are easy
    /// to assert on.
    pub fn video_entry(url: &str, video_id: &str, file_path: Option<&str>) -> VideoEntry {
        VideoEntry {
            url: url.to_string(),
            video_id: video_id.to_string(),
            title: format!("Video {}", url),
            author: "Unknown".to_string(),
            duration: Some(120),
            quality: Some("1080".to_string()),
            tags: vec!["test".to_string()],
            actors: vec![],
            download_date: Utc::now(),
            file_path: file_path.map(|p| p.to_string()),
            thumbnail: None,
            publish_date: None,
            remote_url: None,
        }
    }
}
