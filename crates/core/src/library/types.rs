//! Types for the media library (downloaded video catalog).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Current library file format version.
pub const LIBRARY_VERSION: &str = "1.0";

/// One tracked media item in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Canonical source URL - primary natural key.
    pub url: String,
    /// Source-assigned video identifier - secondary natural key.
    pub video_id: String,
    /// Video title. Collisions are allowed (title matches are advisory).
    pub title: String,
    /// Author/channel name ("Unknown" when the source did not provide one).
    pub author: String,
    /// Duration in seconds (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Quality label (e.g., "720", "1080", "best").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Tags, in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Actors/performers, in insertion order.
    #[serde(default)]
    pub actors: Vec<String>,
    /// When the entry was added. Set at creation, never mutated.
    pub download_date: DateTime<Utc>,
    /// Local file path at creation time; may be relative to the library dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Thumbnail URL (opaque).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Publish date as reported by the source (opaque).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    /// Public locator on the remote store. Written only by the sync
    /// engine, absent -> present (a forced re-sync may overwrite).
    /// Accepts the legacy `cloudflare_url` field name on load.
    #[serde(skip_serializing_if = "Option::is_none", alias = "cloudflare_url")]
    pub remote_url: Option<String>,
}

/// Fields supplied by the acquisition pipeline when adding an entry.
#[derive(Debug, Clone, Default)]
pub struct NewVideo {
    pub url: String,
    pub video_id: String,
    pub title: String,
    pub author: Option<String>,
    pub duration: Option<u32>,
    pub quality: Option<String>,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub file_path: Option<String>,
    pub thumbnail: Option<String>,
    pub publish_date: Option<String>,
}

/// The persisted library aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryData {
    /// Format version tag.
    pub version: String,
    /// All entries, in insertion order. The index of an entry is the
    /// only stable identity used during a sync pass.
    #[serde(default)]
    pub videos: Vec<VideoEntry>,
    /// When the sync engine last persisted a pass over this library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_r2_sync: Option<DateTime<Utc>>,
}

impl LibraryData {
    /// Fresh library with no entries.
    pub fn empty() -> Self {
        Self {
            version: LIBRARY_VERSION.to_string(),
            videos: Vec::new(),
            last_r2_sync: None,
        }
    }
}

/// Outcome of an add operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Entry appended and persisted.
    Added,
    /// An entry with the same url or video_id already exists; nothing
    /// was changed.
    Duplicate,
}

/// Library statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    /// Total entry count.
    pub total_videos: usize,
    /// Sum of known durations in seconds (unknown durations count as 0).
    pub total_duration_seconds: u64,
    /// Known duration in hours, rounded to 2 decimals.
    pub total_duration_hours: f64,
    /// Count of distinct non-empty authors.
    pub unique_authors: usize,
    /// Backing file path.
    pub library_path: PathBuf,
}

/// Errors for library persistence.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Failed to serialize library: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to read library {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed library file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write library to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, id: &str) -> VideoEntry {
        VideoEntry {
            url: url.to_string(),
            video_id: id.to_string(),
            title: "A title".to_string(),
            author: "Unknown".to_string(),
            duration: None,
            quality: None,
            tags: vec![],
            actors: vec![],
            download_date: Utc::now(),
            file_path: None,
            thumbnail: None,
            publish_date: None,
            remote_url: None,
        }
    }

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let json = serde_json::to_string(&entry("https://example.com/v/1", "1")).unwrap();
        assert!(!json.contains("duration"));
        assert!(!json.contains("remote_url"));
        assert!(!json.contains("file_path"));
    }

    #[test]
    fn test_legacy_cloudflare_url_alias() {
        let json = r#"{
            "url": "https://example.com/v/1",
            "video_id": "1",
            "title": "T",
            "author": "A",
            "download_date": "2024-01-01T00:00:00Z",
            "cloudflare_url": "https://pub-acct.r2.dev/1.mp4"
        }"#;
        let parsed: VideoEntry = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.remote_url.as_deref(),
            Some("https://pub-acct.r2.dev/1.mp4")
        );
    }

    #[test]
    fn test_library_data_empty() {
        let data = LibraryData::empty();
        assert_eq!(data.version, LIBRARY_VERSION);
        assert!(data.videos.is_empty());
        assert!(data.last_r2_sync.is_none());
    }

    #[test]
    fn test_library_data_missing_videos_field() {
        let data: LibraryData = serde_json::from_str(r#"{"version":"1.0"}"#).unwrap();
        assert!(data.videos.is_empty());
    }
}
