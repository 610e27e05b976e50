//! Remote object store abstraction.
//!
//! This module provides a `RemoteStore` trait for uploading library
//! files to an object store, plus an S3-compatible implementation
//! (Cloudflare R2). The sync engine only talks to the trait.

mod s3;
mod sign;
mod types;

pub use s3::S3RemoteStore;
pub use types::*;
