//! Types for sync runs.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::library::LibraryError;

/// Options for one sync pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Concurrent upload workers. Clamped to at least 1.
    pub workers: usize,
    /// Skip entries that already carry a remote locator.
    pub skip_existing: bool,
    /// Ask the remote store whether the object exists before
    /// transferring; presence counts as success without a transfer.
    pub check_remote_exists: bool,
    /// Where to write the updated library. `None` overwrites the input.
    pub output_path: Option<PathBuf>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            skip_existing: true,
            check_remote_exists: true,
            output_path: None,
        }
    }
}

/// A per-entry sync failure.
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    /// Title of the failed entry.
    pub title: String,
    /// What went wrong.
    pub reason: String,
}

/// Summary of a sync pass. Counts always add up: every entry in the
/// library is either skipped, already remote, uploaded, or failed -
/// except entries with nothing to do when the library is empty.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Entries in the library when the pass started.
    pub total: usize,
    /// Entries skipped because they already had a remote locator.
    pub skipped: usize,
    /// Entries whose object was already on the remote store (verified,
    /// not re-transferred).
    pub already_remote: usize,
    /// Entries newly uploaded.
    pub uploaded: usize,
    /// Per-entry failures.
    pub failures: Vec<SyncFailure>,
    /// Where the updated library was written.
    pub output_path: PathBuf,
}

impl SyncReport {
    /// Number of failed entries.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when no entry failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Errors that abort a sync run entirely.
///
/// Per-entry problems never surface here; they are recorded in the
/// [`SyncReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Library file not found: {0}")]
    LibraryNotFound(PathBuf),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_clean() {
        let mut report = SyncReport {
            total: 2,
            skipped: 0,
            already_remote: 1,
            uploaded: 1,
            failures: vec![],
            output_path: PathBuf::from("library.json"),
        };
        assert!(report.is_clean());
        assert_eq!(report.failed(), 0);

        report.failures.push(SyncFailure {
            title: "Broken".to_string(),
            reason: "File not found".to_string(),
        });
        assert!(!report.is_clean());
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_options_default() {
        let options = SyncOptions::default();
        assert_eq!(options.workers, 4);
        assert!(options.skip_existing);
        assert!(options.check_remote_exists);
        assert!(options.output_path.is_none());
    }
}
