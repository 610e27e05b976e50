//! Sync engine - uploads library files to the remote store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::library::Library;
use crate::remote::{content_type_for_path, RemoteStore};

use super::types::{SyncError, SyncFailure, SyncOptions, SyncReport};

/// One eligible upload, pinned to the entry's original library index.
struct UploadTask {
    entry_idx: usize,
    title: String,
    path: PathBuf,
    key: String,
}

/// What happened to one dispatched task.
enum TaskOutcome {
    /// Transferred; carries the public locator.
    Uploaded(String),
    /// Object was already on the remote store; carries the locator.
    AlreadyRemote(String),
    /// Per-entry failure; carries the reason.
    Failed(String),
}

/// The sync engine: moves every library entry's local file to the
/// remote store once, attaches the resulting locator, and reports a
/// complete summary no matter how many tasks fail.
///
/// Workers never touch the library. Each task returns its outcome
/// keyed by the entry's original index, and the engine writes results
/// back single-threaded after all tasks have completed, then persists
/// the library exactly once. An interrupted run therefore loses only
/// that run's in-memory progress, never the on-disk library.
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create an engine for the given remote store.
    pub fn new(remote: Arc<dyn RemoteStore>, options: SyncOptions) -> Self {
        Self { remote, options }
    }

    /// Run one sync pass over the library at `library_path`.
    ///
    /// A missing or unreadable library file is fatal and leaves the
    /// file untouched; everything else - missing local files, remote
    /// errors - is recorded per entry in the report.
    pub async fn run(&self, library_path: &Path) -> Result<SyncReport, SyncError> {
        if !library_path.exists() {
            return Err(SyncError::LibraryNotFound(library_path.to_path_buf()));
        }

        let mut library = Library::try_open(library_path)?;
        let library_dir = library.directory();
        let total = library.entries().len();

        let mut skipped = 0usize;
        let mut already_remote = 0usize;
        let mut uploaded = 0usize;
        let mut failures: Vec<SyncFailure> = Vec::new();

        // Classification pass, in library order.
        let mut tasks: Vec<UploadTask> = Vec::new();
        let mut keys_seen: HashMap<String, String> = HashMap::new();

        for (idx, entry) in library.entries().iter().enumerate() {
            if self.options.skip_existing && entry.remote_url.is_some() {
                debug!("Skipping (already in library): {}", entry.title);
                skipped += 1;
                continue;
            }

            let Some(file_path) = entry.file_path.as_deref() else {
                failures.push(SyncFailure {
                    title: entry.title.clone(),
                    reason: "No file path in library entry".to_string(),
                });
                continue;
            };

            let mut path = PathBuf::from(file_path);
            if path.is_relative() {
                path = library_dir.join(path);
            }

            // Object key is the file's base name only, with no
            // namespacing by entry identity, matching what is already
            // on the remote store. Entries with identically named
            // files target the same object.
            let Some(key) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                failures.push(SyncFailure {
                    title: entry.title.clone(),
                    reason: format!("Invalid file path: {}", file_path),
                });
                continue;
            };

            if let Some(other) = keys_seen.insert(key.clone(), entry.title.clone()) {
                warn!(
                    "Remote key collision: '{}' and '{}' both map to object '{}'",
                    other, entry.title, key
                );
            }

            tasks.push(UploadTask {
                entry_idx: idx,
                title: entry.title.clone(),
                path,
                key,
            });
        }

        info!(
            "Syncing {} of {} videos to {} ({} workers)",
            tasks.len(),
            total,
            self.remote.name(),
            self.options.workers.max(1)
        );

        // Bounded fan-out; collect() is the barrier - no library write
        // or persist happens while any task is outstanding.
        let check_remote_exists = self.options.check_remote_exists;
        let outcomes: Vec<(UploadTask, TaskOutcome)> = stream::iter(tasks.into_iter())
            .map(|task| {
                let remote = Arc::clone(&self.remote);
                async move {
                    let outcome =
                        Self::upload_one(remote.as_ref(), &task, check_remote_exists).await;
                    (task, outcome)
                }
            })
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;

        // Single-writer write-back by original index.
        for (task, outcome) in outcomes {
            match outcome {
                TaskOutcome::Uploaded(url) => {
                    info!("Uploaded: {} -> {}", task.title, url);
                    library.set_remote_url(task.entry_idx, url);
                    uploaded += 1;
                }
                TaskOutcome::AlreadyRemote(url) => {
                    info!("Already on remote: {} -> {}", task.title, url);
                    library.set_remote_url(task.entry_idx, url);
                    already_remote += 1;
                }
                TaskOutcome::Failed(reason) => {
                    warn!("Failed: {}: {}", task.title, reason);
                    failures.push(SyncFailure {
                        title: task.title,
                        reason,
                    });
                }
            }
        }

        library.stamp_sync_time(Utc::now());

        let output_path = self
            .options
            .output_path
            .clone()
            .unwrap_or_else(|| library_path.to_path_buf());
        library.save_as(&output_path)?;

        Ok(SyncReport {
            total,
            skipped,
            already_remote,
            uploaded,
            failures,
            output_path,
        })
    }

    /// Process one task: verify the local file, optionally short-
    /// circuit on remote presence, otherwise transfer.
    async fn upload_one(
        remote: &dyn RemoteStore,
        task: &UploadTask,
        check_remote_exists: bool,
    ) -> TaskOutcome {
        match tokio::fs::metadata(&task.path).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return TaskOutcome::Failed(format!("File not found: {}", task.path.display()));
            }
            Err(e) => {
                return TaskOutcome::Failed(format!(
                    "Failed to read {}: {}",
                    task.path.display(),
                    e
                ));
            }
        }

        if check_remote_exists {
            match remote.exists(&task.key).await {
                Ok(true) => {
                    debug!("Object '{}' already on remote, not re-uploading", task.key);
                    return TaskOutcome::AlreadyRemote(remote.public_url(&task.key));
                }
                Ok(false) => {}
                Err(e) => {
                    return TaskOutcome::Failed(format!("Existence check failed: {}", e));
                }
            }
        }

        let content_type = content_type_for_path(&task.path);
        match remote.put_file(&task.path, &task.key, content_type).await {
            Ok(url) => TaskOutcome::Uploaded(url),
            Err(e) => TaskOutcome::Failed(format!("Upload error: {}", e)),
        }
    }
}
