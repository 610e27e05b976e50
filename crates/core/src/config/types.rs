use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Remote object store configuration (S3-compatible / Cloudflare R2)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Account identifier; determines the storage endpoint and the
    /// default public domain.
    pub account_id: String,
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Custom public domain for generated locators (default:
    /// pub-<account_id>.r2.dev).
    #[serde(default)]
    pub public_domain: Option<String>,
    /// Signing region (default: "auto", which is what R2 expects).
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds (default: 300; uploads are large).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_timeout_secs() -> u32 {
    300
}

/// Sync run defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Library file to sync (default: library.json).
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,
    /// Where to write the updated library (default: overwrite input).
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Concurrent upload workers (default: 4).
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Skip entries that already carry a remote locator (default: true).
    #[serde(default = "default_true")]
    pub skip_existing: bool,
    /// Check remote object existence before uploading (default: true).
    #[serde(default = "default_true")]
    pub check_remote_exists: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            output_path: None,
            workers: default_workers(),
            skip_existing: true,
            check_remote_exists: true,
        }
    }
}

fn default_library_path() -> PathBuf {
    PathBuf::from("library.json")
}

fn default_workers() -> usize {
    4
}

fn default_true() -> bool {
    true
}
