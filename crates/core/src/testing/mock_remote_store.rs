//! Mock remote store for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::remote::{RemoteStore, RemoteStoreError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    /// Object key the file was stored under.
    pub key: String,
    /// Local path that was uploaded.
    pub path: PathBuf,
    /// Content type sent with the upload.
    pub content_type: String,
}

/// Mock implementation of the RemoteStore trait.
///
/// Provides controllable behavior for testing:
/// - Preload keys to simulate objects already on the remote store
/// - Track uploads for assertions
/// - Inject per-key upload failures
/// - Inject existence-check failures
#[derive(Debug)]
pub struct MockRemoteStore {
    /// Keys currently "on" the remote store.
    existing: Arc<RwLock<HashSet<String>>>,
    /// Recorded uploads.
    puts: Arc<RwLock<Vec<RecordedPut>>>,
    /// Keys whose upload should fail, with the error message.
    failing_puts: Arc<RwLock<HashMap<String, String>>>,
    /// Keys whose existence check should fail, with the error message.
    failing_exists: Arc<RwLock<HashMap<String, String>>>,
    /// If set, every existence check fails with this message.
    exists_error: Arc<RwLock<Option<String>>>,
    public_base: String,
}

impl Default for MockRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteStore {
    /// Create a new mock store with the test public base URL.
    pub fn new() -> Self {
        Self::with_public_base("https://pub-test.r2.dev")
    }

    /// Create a mock store with a custom public base URL.
    pub fn with_public_base(public_base: impl Into<String>) -> Self {
        Self {
            existing: Arc::new(RwLock::new(HashSet::new())),
            puts: Arc::new(RwLock::new(Vec::new())),
            failing_puts: Arc::new(RwLock::new(HashMap::new())),
            failing_exists: Arc::new(RwLock::new(HashMap::new())),
            exists_error: Arc::new(RwLock::new(None)),
            public_base: public_base.into(),
        }
    }

    /// Mark a key as already present on the remote store.
    pub async fn preload_key(&self, key: &str) {
        self.existing.write().await.insert(key.to_string());
    }

    /// Whether a key is currently present.
    pub async fn has_key(&self, key: &str) -> bool {
        self.existing.read().await.contains(key)
    }

    /// Get all recorded uploads.
    pub async fn recorded_puts(&self) -> Vec<RecordedPut> {
        self.puts.read().await.clone()
    }

    /// Get the number of uploads performed.
    pub async fn put_count(&self) -> usize {
        self.puts.read().await.len()
    }

    /// Configure uploads of `key` to fail with the given message.
    pub async fn fail_put_for_key(&self, key: &str, message: &str) {
        self.failing_puts
            .write()
            .await
            .insert(key.to_string(), message.to_string());
    }

    /// Configure existence checks of `key` to fail with the given message.
    pub async fn fail_exists_for_key(&self, key: &str, message: &str) {
        self.failing_exists
            .write()
            .await
            .insert(key.to_string(), message.to_string());
    }

    /// Configure every existence check to fail with the given message.
    pub async fn set_exists_error(&self, message: &str) {
        *self.exists_error.write().await = Some(message.to_string());
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn exists(&self, key: &str) -> Result<bool, RemoteStoreError> {
        if let Some(message) = self.exists_error.read().await.clone() {
            return Err(RemoteStoreError::ConnectionFailed(message));
        }
        if let Some(message) = self.failing_exists.read().await.get(key).cloned() {
            return Err(RemoteStoreError::ConnectionFailed(message));
        }
        Ok(self.existing.read().await.contains(key))
    }

    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        if let Some(message) = self.failing_puts.read().await.get(key).cloned() {
            return Err(RemoteStoreError::ApiError(message));
        }

        self.puts.write().await.push(RecordedPut {
            key: key.to_string(),
            path: path.to_path_buf(),
            content_type: content_type.to_string(),
        });
        self.existing.write().await.insert(key.to_string());

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
