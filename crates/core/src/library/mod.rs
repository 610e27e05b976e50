//! Media library - the catalog of downloaded videos.
//!
//! The library is the single source of truth for what has been
//! downloaded: the acquisition pipeline checks it to skip duplicates
//! before fetching anything, and the sync engine reads it to decide
//! what still needs uploading.

mod store;
mod types;

pub use store::Library;
pub use types::{
    AddOutcome, LibraryData, LibraryError, LibraryStats, NewVideo, VideoEntry, LIBRARY_VERSION,
};
