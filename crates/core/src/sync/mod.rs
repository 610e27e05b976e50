//! Library-to-remote synchronization.
//!
//! The engine reads a library, fans uploads out across a bounded
//! worker pool against a [`crate::remote::RemoteStore`], and writes
//! every completed result back into the library in one persist after
//! all tasks finish.

mod engine;
mod types;

pub use engine::SyncEngine;
pub use types::{SyncError, SyncFailure, SyncOptions, SyncReport};
