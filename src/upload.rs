#![doc = "Storage backends for the CLI: an HTTP bucket client and a local-directory backend."]
//
//! # Storage backends (CLI <-> Core)
//!
//! This module wires the [`StorageBackend`] trait from `report-publish-core`
//! to real destinations.
//!
//! - [`BucketClient`] uploads over HTTP: one `PUT {endpoint}/{bucket}/{key}`
//!   per object, with the resolved `Content-Type` and an optional bearer token.
//! - [`DirectoryBackend`] writes objects under a local directory, which is
//!   handy for dry runs and tests.
//!
//! Both are shared across concurrent upload tasks; neither holds mutable state.

use std::env;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

pub use report_publish_core::contract::{BackendError, StorageBackend};

pub const STORAGE_ENDPOINT_ENV: &str = "STORAGE_ENDPOINT";
pub const STORAGE_TOKEN_ENV: &str = "STORAGE_TOKEN";

pub struct BucketClient {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl BucketClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, BackendError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            tracing::error!(error = ?e, endpoint, "Invalid storage endpoint URL");
            e
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(format!("storage endpoint {endpoint} cannot be used as a base URL").into());
        }
        Ok(BucketClient {
            client: reqwest::Client::new(),
            endpoint,
            token,
        })
    }

    /// Builds a client from `endpoint`, falling back to `STORAGE_ENDPOINT`.
    /// `STORAGE_TOKEN`, when set, is sent as a bearer token.
    pub fn new_from_env(endpoint: Option<String>) -> Result<Self, BackendError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let endpoint = match endpoint {
            Some(endpoint) => endpoint,
            None => env::var(STORAGE_ENDPOINT_ENV).map_err(|e| {
                tracing::error!(error = ?e, "STORAGE_ENDPOINT missing in environment");
                e
            })?,
        };
        let token = env::var(STORAGE_TOKEN_ENV).ok();
        tracing::info!(
            endpoint = %endpoint,
            token_set = token.is_some(),
            "Initialized BucketClient"
        );
        Self::new(&endpoint, token)
    }

    /// `{endpoint}/{bucket}/{key...}` with every segment percent-encoded.
    pub fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(bucket).extend(key.split('/'));
        }
        url
    }
}

#[async_trait]
impl StorageBackend for BucketClient {
    async fn create(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        let url = self.object_url(bucket, key);
        tracing::debug!(url = %url, content_type, size = bytes.len(), "PUT object");

        let mut request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = ?e, url = %url, "Storage request failed");
            e
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(status = %status, url = %url, "Storage returned error. Response body: {body}");
            return Err(format!("storage returned {status} for {bucket}/{key}: {body}").into());
        }
        Ok(())
    }
}

/// Writes each object to `{base_dir}/{bucket}/{key}`.
pub struct DirectoryBackend {
    base_dir: PathBuf,
}

impl DirectoryBackend {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Maps `bucket`/`key` under `base_dir`. Every segment must be a plain
    /// name, so the result never leaves `base_dir`.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, BackendError> {
        let mut path = self.base_dir.clone();
        for segment in std::iter::once(bucket).chain(key.split('/')) {
            if segment.is_empty() {
                continue;
            }
            if !is_plain_segment(segment) {
                return Err(format!("refusing to store {bucket}/{key}: invalid segment {segment:?}").into());
            }
            path.push(segment);
        }
        Ok(path)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl StorageBackend for DirectoryBackend {
    async fn create(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        let path = self.object_path(bucket, key).map_err(|e| {
            tracing::error!(error = %e, bucket, key, "Rejected object key");
            e
        })?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!(error = ?e, path = %parent.display(), "Failed to create object directory");
                e
            })?;
        }
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            tracing::error!(error = ?e, path = %path.display(), "Failed to write object");
            e
        })?;
        tracing::debug!(path = %path.display(), content_type, "Wrote object to local directory");
        Ok(())
    }
}
