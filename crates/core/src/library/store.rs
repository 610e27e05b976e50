//! JSON-backed library store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::types::{
    AddOutcome, LibraryData, LibraryError, LibraryStats, NewVideo, VideoEntry,
};

/// The media library: an in-memory catalog of downloaded videos backed
/// by a single JSON file.
///
/// Construct one explicitly and pass it to whoever needs it; there is
/// no process-wide instance. Every durable mutation rewrites the whole
/// backing file via a temp-file-plus-rename, so the on-disk library is
/// always a complete, consistent snapshot.
pub struct Library {
    path: PathBuf,
    data: LibraryData,
}

impl Library {
    /// Open the library at `path`.
    ///
    /// A missing file yields an empty library. A malformed file is
    /// logged and replaced with an empty library; loading never fails.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<LibraryData>(&raw) {
                Ok(data) => {
                    debug!("Loaded library with {} videos", data.videos.len());
                    data
                }
                Err(e) => {
                    error!("Error loading library {}: {}", path.display(), e);
                    LibraryData::empty()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Library file {} doesn't exist, starting fresh", path.display());
                LibraryData::empty()
            }
            Err(e) => {
                error!("Error reading library {}: {}", path.display(), e);
                LibraryData::empty()
            }
        };

        Self { path, data }
    }

    /// Open the library at `path`, refusing unreadable or malformed
    /// content.
    ///
    /// Unlike [`Library::open`] this never substitutes an empty
    /// library: a caller that intends to rewrite the backing file must
    /// not start from a blank slate when the file exists but cannot be
    /// parsed, or it would destroy a recoverable catalog on save.
    pub fn try_open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let raw = fs::read_to_string(&path).map_err(|source| LibraryError::Read {
            path: path.clone(),
            source,
        })?;
        let data =
            serde_json::from_str::<LibraryData>(&raw).map_err(|source| LibraryError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!("Loaded library with {} videos", data.videos.len());
        Ok(Self { path, data })
    }

    /// Wrap already-loaded data (used by tests and by callers that
    /// build a library programmatically).
    pub fn from_data(path: impl Into<PathBuf>, data: LibraryData) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the backing file, for resolving relative
    /// entry paths. Empty parent (bare filename) resolves to ".".
    pub fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Persist the whole library to its backing file.
    pub fn save(&self) -> Result<(), LibraryError> {
        self.save_as(&self.path)
    }

    /// Persist the whole library to `path`.
    ///
    /// Writes to a temporary sibling file first and renames it into
    /// place, so a crash mid-write never truncates an existing library.
    pub fn save_as(&self, path: &Path) -> Result<(), LibraryError> {
        let json = serde_json::to_string_pretty(&self.data)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).map_err(|source| LibraryError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| LibraryError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "Saved library with {} videos to {}",
            self.data.videos.len(),
            path.display()
        );
        Ok(())
    }

    /// Check whether a video already exists in the library.
    ///
    /// Matches by `url` first (most reliable), then by `video_id`, then
    /// by exact `title`. A title match is weak evidence - the caller
    /// must independently confirm it before treating the entry as a
    /// true duplicate.
    pub fn check_duplicate(
        &self,
        url: Option<&str>,
        video_id: Option<&str>,
        title: Option<&str>,
    ) -> Option<&VideoEntry> {
        if let Some(url) = url {
            if let Some(video) = self.data.videos.iter().find(|v| v.url == url) {
                debug!("Found duplicate by URL: {}", url);
                return Some(video);
            }
        }

        if let Some(video_id) = video_id {
            if let Some(video) = self.data.videos.iter().find(|v| v.video_id == video_id) {
                debug!("Found duplicate by ID: {}", video_id);
                return Some(video);
            }
        }

        if let Some(title) = title {
            if let Some(video) = self.data.videos.iter().find(|v| v.title == title) {
                debug!("Found potential duplicate by title: {}", title);
                return Some(video);
            }
        }

        None
    }

    /// Add a new entry and persist.
    ///
    /// The duplicate gate checks `url` and `video_id` only; title is
    /// deliberately excluded. Returns [`AddOutcome::Duplicate`] without
    /// mutating anything when the gate matches.
    pub fn add(&mut self, new: NewVideo) -> Result<AddOutcome, LibraryError> {
        if self
            .check_duplicate(Some(&new.url), Some(&new.video_id), None)
            .is_some()
        {
            warn!("Video already exists in library: {}", new.title);
            return Ok(AddOutcome::Duplicate);
        }

        let entry = VideoEntry {
            url: new.url,
            video_id: new.video_id,
            title: new.title.clone(),
            author: new.author.unwrap_or_else(|| "Unknown".to_string()),
            duration: new.duration,
            quality: new.quality,
            tags: new.tags,
            actors: new.actors,
            download_date: Utc::now(),
            file_path: new.file_path,
            thumbnail: new.thumbnail,
            publish_date: new.publish_date,
            remote_url: None,
        };

        self.data.videos.push(entry);
        debug!("Added video to library: {}", new.title);

        self.save()?;
        Ok(AddOutcome::Added)
    }

    /// Remove the first entry with the given `video_id` and persist.
    ///
    /// Returns `Ok(false)` when no entry matched.
    pub fn remove(&mut self, video_id: &str) -> Result<bool, LibraryError> {
        let Some(idx) = self.data.videos.iter().position(|v| v.video_id == video_id) else {
            return Ok(false);
        };

        self.data.videos.remove(idx);
        self.save()?;
        debug!("Removed video from library: {}", video_id);
        Ok(true)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[VideoEntry] {
        &self.data.videos
    }

    /// Look up an entry by `video_id`.
    pub fn get(&self, video_id: &str) -> Option<&VideoEntry> {
        self.data.videos.iter().find(|v| v.video_id == video_id)
    }

    /// Library statistics.
    pub fn stats(&self) -> LibraryStats {
        let total_duration_seconds: u64 = self
            .data
            .videos
            .iter()
            .filter_map(|v| v.duration)
            .map(u64::from)
            .sum();

        let unique_authors = self
            .data
            .videos
            .iter()
            .map(|v| v.author.as_str())
            .filter(|a| !a.is_empty())
            .collect::<std::collections::HashSet<_>>()
            .len();

        LibraryStats {
            total_videos: self.data.videos.len(),
            total_duration_seconds,
            total_duration_hours: (total_duration_seconds as f64 / 3600.0 * 100.0).round()
                / 100.0,
            unique_authors,
            library_path: self.path.clone(),
        }
    }

    /// Case-insensitive substring search over title, author, tags and
    /// actors.
    ///
    /// Title and author matches short-circuit to the next entry. Tag
    /// and actor checks are independent branches: an entry whose title
    /// and author don't match but which matches both a tag and an
    /// actor is returned twice. That double-append is long-standing
    /// observable behavior and is kept as-is.
    pub fn search(&self, query: &str) -> Vec<VideoEntry> {
        let query = query.to_lowercase();
        let mut results = Vec::new();

        for video in &self.data.videos {
            if video.title.to_lowercase().contains(&query) {
                results.push(video.clone());
                continue;
            }

            if video.author.to_lowercase().contains(&query) {
                results.push(video.clone());
                continue;
            }

            if video.tags.iter().any(|t| t.to_lowercase().contains(&query)) {
                results.push(video.clone());
            }

            if video
                .actors
                .iter()
                .any(|a| a.to_lowercase().contains(&query))
            {
                results.push(video.clone());
            }
        }

        results
    }

    /// Replace the library with an empty one and persist.
    pub fn clear(&mut self) -> Result<(), LibraryError> {
        self.data = LibraryData::empty();
        self.save()
    }

    /// When the sync engine last persisted a pass.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.data.last_r2_sync
    }

    /// Attach a remote locator to the entry at `idx`.
    ///
    /// Position-addressed on purpose: the sync engine records results
    /// against the entry's original index, and distinct tasks always
    /// target distinct indices. Only the sync engine should call this.
    pub(crate) fn set_remote_url(&mut self, idx: usize, url: String) {
        if let Some(video) = self.data.videos.get_mut(idx) {
            video.remote_url = Some(url);
        }
    }

    /// Stamp the last-sync timestamp. Only the sync engine should call
    /// this.
    pub(crate) fn stamp_sync_time(&mut self, at: DateTime<Utc>) {
        self.data.last_r2_sync = Some(at);
    }
}
