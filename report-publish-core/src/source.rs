//! Lazy, single-use byte producers.
//!
//! Nothing is read when a [`ByteSource`] is built; the I/O happens in
//! [`ByteSource::realize`], which consumes the source.

use std::fmt;
use std::path::PathBuf;

use reqwest::Url;

use crate::error::PublishError;

type Thunk = Box<dyn FnOnce() -> Result<Vec<u8>, PublishError> + Send + 'static>;

pub struct ByteSource {
    thunk: Thunk,
    origin: String,
}

impl ByteSource {
    /// Reads the whole file when realized.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let origin = path.display().to_string();
        Self {
            thunk: Box::new(move || std::fs::read(&path).map_err(|e| PublishError::io(&path, e))),
            origin,
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            origin: format!("<{} bytes>", bytes.len()),
            thunk: Box::new(move || Ok(bytes)),
        }
    }

    /// UTF-8 encoding of `text`.
    pub fn from_string(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            origin: format!("<{} chars>", text.chars().count()),
            thunk: Box::new(move || Ok(text.into_bytes())),
        }
    }

    /// UTF-8 encoding of whatever `produce` returns at realization time.
    pub fn from_string_fn<F>(produce: F) -> Self
    where
        F: FnOnce() -> String + Send + 'static,
    {
        Self {
            origin: String::from("<deferred string>"),
            thunk: Box::new(move || Ok(produce().into_bytes())),
        }
    }

    /// Body of a `GET url`, fetched when realized. Realize it off the async
    /// runtime (the dispatcher uses the blocking pool); non-2xx is an error.
    pub fn from_url(url: Url) -> Self {
        Self {
            origin: url.to_string(),
            thunk: Box::new(move || fetch(&url)),
        }
    }

    pub fn from_fn<F>(origin: impl Into<String>, produce: F) -> Self
    where
        F: FnOnce() -> Result<Vec<u8>, PublishError> + Send + 'static,
    {
        Self {
            thunk: Box::new(produce),
            origin: origin.into(),
        }
    }

    /// Where the bytes come from, for logs.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn realize(self) -> Result<Vec<u8>, PublishError> {
        (self.thunk)()
    }
}

fn fetch(url: &Url) -> Result<Vec<u8>, PublishError> {
    let fetch_error = |source| PublishError::Fetch {
        url: url.to_string(),
        source,
    };
    let response = reqwest::blocking::get(url.clone())
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?;
    let body = response.bytes().map_err(fetch_error)?;
    Ok(body.to_vec())
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
