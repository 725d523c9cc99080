//! Extension → MIME type lookup for uploaded objects.
//!
//! The table is a plain value: build it once (usually via [`Default`]) and hand
//! it to whoever needs it. Lookup is case-sensitive, so `report.CSS` resolves to
//! the default type.

use std::collections::HashMap;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const DEFAULT_TABLE: [(&str, &str); 8] = [
    ("html", "text/html"),
    ("htm", "text/html"),
    ("log", "text/plain"),
    ("txt", "text/plain"),
    ("css", "text/css"),
    ("xml", "text/xml"),
    ("zip", "application/zip"),
    ("js", "text/javascript"),
];

/// Immutable mapping from lowercase extension to MIME type, plus a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeTable {
    by_extension: HashMap<String, String>,
    default: String,
}

impl ContentTypeTable {
    pub fn new<I, K, V>(entries: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            by_extension: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default: default.into(),
        }
    }

    /// Content type for `filename`, which may be a bare name or a `/` or `\`
    /// separated key. Never fails.
    pub fn resolve(&self, filename: &str) -> &str {
        self.by_extension
            .get(extension(filename))
            .map(String::as_str)
            .unwrap_or(&self.default)
    }

    pub fn default_type(&self) -> &str {
        &self.default
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE, DEFAULT_CONTENT_TYPE)
    }
}

/// Text after the last `.` of the last segment, or `""` when there is none.
fn extension(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => "",
    }
}
