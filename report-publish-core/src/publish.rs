//! High-level pipeline: select an entry point, then upload everything.
//!
//! # Responsibilities
//! - Materialize the report destination and decide its entry point
//!   ([`select_entry_point`]); failures here abort before any upload starts.
//! - Fan the resulting files out to the storage backend ([`upload_all`]).
//! - Report the storage key a viewer should follow.
//!
//! # Error Handling
//! Only traversal and path errors are returned. Upload failures are logged by
//! the upload tasks and are not reflected in [`PublishedReport`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::content_type::ContentTypeTable;
use crate::contract::StorageBackend;
use crate::entry_point::select_entry_point;
use crate::error::PublishError;
use crate::upload::{upload_all, upload_key};

/// Everything needed to publish one report.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Report output: a single file or a directory.
    pub destination: PathBuf,
    /// Optional file inside `destination` that links to the others.
    pub entry_point_hint: Option<PathBuf>,
    /// All keys are relative to this directory.
    pub root: PathBuf,
    pub bucket: String,
    /// Key prefix inside the bucket; may be empty.
    pub folder: String,
}

/// What a caller can link to after publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedReport {
    /// Full storage key of the entry point (folder prefix applied).
    pub entry_point_key: String,
    /// Number of objects handed to the backend.
    pub file_count: usize,
}

pub async fn publish<B>(
    backend: Arc<B>,
    content_types: Arc<ContentTypeTable>,
    request: &PublishRequest,
) -> Result<PublishedReport, PublishError>
where
    B: StorageBackend + ?Sized + 'static,
{
    info!(
        destination = %request.destination.display(),
        bucket = %request.bucket,
        folder = %request.folder,
        "[PUBLISH] Starting report publish"
    );

    let selected = select_entry_point(
        &request.destination,
        request.entry_point_hint.as_deref(),
        &request.root,
    )
    .map_err(|e| {
        error!(error = %e, "[PUBLISH][ERROR] Failed to collect report files");
        e
    })?;

    let entry_point_key = upload_key(&request.folder, &selected.entry_point);
    let file_count = selected.files.len();

    upload_all(
        backend,
        content_types,
        &request.bucket,
        &request.folder,
        selected.files,
    )
    .await;

    info!(
        entry_point = %entry_point_key,
        files = file_count,
        "[PUBLISH] Report published"
    );
    Ok(PublishedReport {
        entry_point_key,
        file_count,
    })
}
