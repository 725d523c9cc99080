//! Flattens a multi-file report into one zip, built in memory.

use std::io::{Cursor, Write};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::PublishError;
use crate::materialize::FileMapping;
use crate::source::ByteSource;

/// Realizes every entry of `files` in mapping order and zips them. Entry names
/// are the `/`-joined relative paths, the same strings used for storage keys.
///
/// The first unreadable entry aborts packing.
pub fn pack(files: FileMapping) -> Result<ByteSource, PublishError> {
    let archive = zip_files(files)?;
    Ok(ByteSource::from_bytes(archive))
}

fn zip_files(files: FileMapping) -> Result<Vec<u8>, PublishError> {
    let count = files.len();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (path, source) in files {
        let name = path.to_key_string();
        let bytes = source.realize()?;
        debug!(entry = %name, size = bytes.len(), "Adding archive entry");
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&bytes)
            .map_err(|e| PublishError::io(name.as_str(), e))?;
    }

    let archive = zip.finish()?.into_inner();
    info!(entries = count, size = archive.len(), "Built report archive");
    Ok(archive)
}
