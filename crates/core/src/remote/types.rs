//! Types for remote object store operations.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur talking to the remote object store.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for remote object stores.
///
/// Implementations must be safe for concurrent use - the sync engine
/// calls `exists` and `put_file` from many workers at once.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Implementation name (for logging).
    fn name(&self) -> &str;

    /// Check whether an object with this key already exists remotely.
    async fn exists(&self, key: &str) -> Result<bool, RemoteStoreError>;

    /// Upload a local file under `key` and return its public locator.
    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError>;

    /// Public locator for an object key, whether or not it exists.
    fn public_url(&self, key: &str) -> String;
}

/// Content type for an uploaded file, by extension.
///
/// Everything unrecognized falls back to video/mp4, which is what the
/// library overwhelmingly contains.
pub fn content_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("ts") => "video/mp2t",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "video/mp4",
    }
}
