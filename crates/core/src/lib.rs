pub mod config;
pub mod library;
pub mod remote;
pub mod sync;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, RemoteConfig,
    SyncConfig,
};
pub use library::{
    AddOutcome, Library, LibraryData, LibraryError, LibraryStats, NewVideo, VideoEntry,
};
pub use remote::{content_type_for_path, RemoteStore, RemoteStoreError, S3RemoteStore};
pub use sync::{SyncEngine, SyncError, SyncFailure, SyncOptions, SyncReport};
