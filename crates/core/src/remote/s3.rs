//! S3-compatible remote store implementation (Cloudflare R2).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Body, Client, StatusCode};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::config::RemoteConfig;

use super::sign::{encode_key, sign_request, SigningParams, EMPTY_PAYLOAD_SHA256};
use super::types::{RemoteStore, RemoteStoreError};

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Remote store backed by an S3-compatible API, addressed path-style
/// against the R2 endpoint for the configured account.
pub struct S3RemoteStore {
    client: Client,
    config: RemoteConfig,
    host: String,
    public_base: String,
}

impl S3RemoteStore {
    /// Create a new store from remote configuration.
    pub fn new(config: RemoteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        let host = format!("{}.r2.cloudflarestorage.com", config.account_id);
        let public_base = match &config.public_domain {
            Some(domain) => format!("https://{}", domain.trim_end_matches('/')),
            None => format!("https://pub-{}.r2.dev", config.account_id),
        };

        Self {
            client,
            config,
            host,
            public_base,
        }
    }

    /// Canonical URI for an object: `/{bucket}/{encoded key}`.
    fn canonical_uri(&self, key: &str) -> String {
        format!("/{}/{}", self.config.bucket, encode_key(key))
    }

    fn endpoint_url(&self, canonical_uri: &str) -> String {
        format!("https://{}{}", self.host, canonical_uri)
    }

    fn map_request_error(e: reqwest::Error) -> RemoteStoreError {
        if e.is_timeout() {
            RemoteStoreError::Timeout
        } else if e.is_connect() {
            RemoteStoreError::ConnectionFailed(e.to_string())
        } else {
            RemoteStoreError::ApiError(e.to_string())
        }
    }

    /// Hex SHA-256 of a file, read in chunks so large videos never sit
    /// in memory.
    async fn hash_file(path: &Path) -> Result<String, RemoteStoreError> {
        let file = File::open(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RemoteStoreError::FileNotFound(path.to_path_buf())
            } else {
                RemoteStoreError::Io(e)
            }
        })?;

        let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[async_trait]
impl RemoteStore for S3RemoteStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn exists(&self, key: &str) -> Result<bool, RemoteStoreError> {
        let canonical_uri = self.canonical_uri(key);
        let signed = sign_request(&SigningParams {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
            method: "HEAD",
            host: &self.host,
            canonical_uri: &canonical_uri,
            payload_hash: EMPTY_PAYLOAD_SHA256,
            timestamp: Utc::now(),
        });

        let response = self
            .client
            .head(self.endpoint_url(&canonical_uri))
            .header(header::AUTHORIZATION, &signed.authorization)
            .header("x-amz-content-sha256", EMPTY_PAYLOAD_SHA256)
            .header("x-amz-date", &signed.amz_date)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                RemoteStoreError::AuthenticationFailed(format!("HTTP {}", response.status())),
            ),
            status => Err(RemoteStoreError::ApiError(format!("HTTP {}", status))),
        }
    }

    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<String, RemoteStoreError> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RemoteStoreError::FileNotFound(path.to_path_buf())
            } else {
                RemoteStoreError::Io(e)
            }
        })?;

        // The payload hash is part of the signature, so hash first and
        // stream the body afterwards.
        let payload_hash = Self::hash_file(path).await?;

        let canonical_uri = self.canonical_uri(key);
        let signed = sign_request(&SigningParams {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
            method: "PUT",
            host: &self.host,
            canonical_uri: &canonical_uri,
            payload_hash: &payload_hash,
            timestamp: Utc::now(),
        });

        let file = File::open(path).await?;
        let body = Body::wrap_stream(ReaderStream::new(file));

        debug!("Uploading {} as {} ({} bytes)", path.display(), key, meta.len());

        let response = self
            .client
            .put(self.endpoint_url(&canonical_uri))
            .header(header::AUTHORIZATION, &signed.authorization)
            .header("x-amz-content-sha256", &payload_hash)
            .header("x-amz-date", &signed.amz_date)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, meta.len())
            .body(body)
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            status if status.is_success() => Ok(self.public_url(key)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                RemoteStoreError::AuthenticationFailed(format!("HTTP {}", response.status())),
            ),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteStoreError::ApiError(format!(
                    "HTTP {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                )))
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
