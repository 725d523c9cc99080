//! Decides which single path a viewer should be sent to.
//!
//! A report is published as one link. One file links to itself. Several files
//! link to the caller's hint when the hint is one of them. Otherwise they are
//! zipped and the zip is the link.

use std::path::Path;

use tracing::{debug, info};

use crate::archive::pack;
use crate::error::PublishError;
use crate::materialize::{materialize, FileMapping};
use crate::paths::{relativize, RelativePath};
use crate::source::ByteSource;

/// Files to upload plus the one path that gives access to all of them.
///
/// When `files` is non-empty, `entry_point` is one of its keys. When it is
/// empty, `entry_point` is the relativized destination and names nothing that
/// will be uploaded.
#[derive(Debug)]
pub struct FilesWithEntryPoint {
    pub files: FileMapping,
    pub entry_point: RelativePath,
}

impl FilesWithEntryPoint {
    pub fn single_file(path: RelativePath, source: ByteSource) -> Self {
        let mut files = FileMapping::new();
        files.insert(path.clone(), source);
        Self {
            files,
            entry_point: path,
        }
    }
}

/// Materializes `destination` and picks its entry point.
///
/// `entry_point_hint` is only consulted when the destination holds two or more
/// files, and only used when it relativizes to exactly one of their keys.
pub fn select_entry_point(
    destination: &Path,
    entry_point_hint: Option<&Path>,
    root: &Path,
) -> Result<FilesWithEntryPoint, PublishError> {
    let destination_path =
        relativize(root, destination).map_err(|e| PublishError::io(destination, e))?;
    let files = materialize(destination, root)?;

    if files.is_empty() {
        info!(destination = %destination_path, "No report files found");
        return Ok(FilesWithEntryPoint {
            files,
            entry_point: destination_path,
        });
    }

    if files.len() == 1 {
        if let Some(entry_point) = files.keys().next().cloned() {
            info!(entry_point = %entry_point, "Report has a single file");
            return Ok(FilesWithEntryPoint { files, entry_point });
        }
    }

    let hinted = entry_point_hint
        .map(|hint| relativize(root, hint).map_err(|e| PublishError::io(hint, e)))
        .transpose()?;

    if let Some(hinted) = hinted {
        if files.contains_key(&hinted) {
            info!(
                entry_point = %hinted,
                files = files.len(),
                "Using entry point hint, uploading files as-is"
            );
            return Ok(FilesWithEntryPoint {
                files,
                entry_point: hinted,
            });
        }
        debug!(hint = %hinted, "Entry point hint is not one of the report files");
    }

    let zip_path = destination_path.join(format!("{}.zip", destination_path.file_name()));
    info!(
        entry_point = %zip_path,
        files = files.len(),
        "No usable entry point, zipping report"
    );
    let archive = pack(files)?;
    Ok(FilesWithEntryPoint::single_file(zip_path, archive))
}
