use std::path::PathBuf;

/// Failures that abort a publish before any upload starts, or abort the
/// realization of a single byte source.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("failed to build report archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PublishError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Io {
            path: path.into(),
            source,
        }
    }
}
