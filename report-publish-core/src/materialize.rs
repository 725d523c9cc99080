//! Turns a report destination into a lazy [`FileMapping`].

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::PublishError;
use crate::paths::{relativize, RelativePath};
use crate::source::ByteSource;

/// Root-relative path → lazy contents, in insertion order.
pub type FileMapping = IndexMap<RelativePath, ByteSource>;

/// Collects every regular file under `destination`, keyed relative to `root`.
///
/// A missing destination yields an empty mapping. Directory traversal is
/// depth-first with entries sorted by name, so the resulting order is stable
/// across runs. No file is read here.
pub fn materialize(destination: &Path, root: &Path) -> Result<FileMapping, PublishError> {
    let mut files = FileMapping::new();

    if destination.is_file() {
        let key = relativize(root, destination).map_err(|e| PublishError::io(destination, e))?;
        debug!(path = %key, "Destination is a single file");
        files.insert(key, ByteSource::from_file(destination));
        return Ok(files);
    }

    if !destination.is_dir() {
        info!(destination = %destination.display(), "Destination does not exist, nothing to publish");
        return Ok(files);
    }

    let walker = WalkDir::new(destination)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_dangling_link(&e) => {
                debug!(path = ?e.path(), "Skipping symlink with missing target");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let key = relativize(root, entry.path()).map_err(|e| PublishError::io(entry.path(), e))?;
        debug!(path = %key, "Found report file");
        files.insert(key, ByteSource::from_file(entry.into_path()));
    }

    info!(
        destination = %destination.display(),
        files = files.len(),
        "Materialized report directory"
    );
    Ok(files)
}

/// A followed symlink whose target does not exist. Loops and permission
/// errors are not matched.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|p| std::fs::symlink_metadata(p).ok())
            .is_some_and(|m| m.file_type().is_symlink())
}
