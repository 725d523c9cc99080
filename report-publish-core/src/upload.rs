//! Concurrent fan-out of a [`FileMapping`] to a [`StorageBackend`].
//!
//! One tokio task per file, no limit, then a barrier that waits for all of
//! them. A failed upload is logged by its own task and nothing else: the
//! dispatcher neither aborts the batch nor reports per-file results.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::content_type::ContentTypeTable;
use crate::contract::StorageBackend;
use crate::materialize::FileMapping;
use crate::paths::RelativePath;
use crate::source::ByteSource;

/// Storage key for `path` under `folder`, `/`-separated throughout.
///
/// Backslashes in either part become `/`; slashes around `folder` are trimmed
/// and an empty folder leaves the path as the whole key.
pub fn upload_key(folder: &str, path: &RelativePath) -> String {
    let folder = folder.replace('\\', "/");
    let prefix = folder.trim_matches('/');
    let path = path.to_key_string().replace('\\', "/");
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}

/// Uploads every file in `files` to `bucket` under `folder` and waits for all
/// uploads to finish.
///
/// Returns once every task has ended, whatever their outcome. A task that
/// panics or is cancelled is logged and waiting carries on with the rest.
pub async fn upload_all<B>(
    backend: Arc<B>,
    content_types: Arc<ContentTypeTable>,
    bucket: &str,
    folder: &str,
    files: FileMapping,
) where
    B: StorageBackend + ?Sized + 'static,
{
    info!(bucket, folder, files = files.len(), "Starting uploads");

    let mut paths = Vec::with_capacity(files.len());
    let mut handles = Vec::with_capacity(files.len());
    for (path, source) in files {
        let key = upload_key(folder, &path);
        let backend = Arc::clone(&backend);
        let content_types = Arc::clone(&content_types);
        let bucket = bucket.to_string();
        handles.push(tokio::spawn(async move {
            let content_type = content_types.resolve(&key);
            upload_file(backend.as_ref(), &bucket, &key, content_type, source).await;
        }));
        paths.push(path);
    }

    let outcomes = join_all(handles).await;
    for (path, outcome) in paths.iter().zip(outcomes) {
        if let Err(e) = outcome {
            warn!(path = %path, error = %e, "Upload of file interrupted");
        }
    }
    info!(bucket, folder, tasks = paths.len(), "All upload tasks finished");
}

async fn upload_file<B>(
    backend: &B,
    bucket: &str,
    key: &str,
    content_type: &str,
    source: ByteSource,
) where
    B: StorageBackend + ?Sized,
{
    let origin = source.origin().to_string();
    let bytes = match tokio::task::spawn_blocking(move || source.realize()).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            error!(key, origin = %origin, error = %e, "Failed to read contents for upload");
            return;
        }
        Err(e) => {
            error!(key, origin = %origin, error = %e, "Reading contents for upload did not complete");
            return;
        }
    };

    debug!(bucket, key, content_type, size = bytes.len(), "Uploading object");
    match backend.create(bucket, key, content_type, bytes).await {
        Ok(()) => info!(bucket, key, content_type, "Uploaded object"),
        Err(e) => error!(bucket, key, error = ?e, "Upload failed"),
    }
}
