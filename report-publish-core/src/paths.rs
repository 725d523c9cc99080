//! Path normalization and root-relative keys.
//!
//! Every path that reaches the pipeline (destination, entry-point hint, each
//! discovered file) goes through [`relativize`] against the same root, so
//! equality of [`RelativePath`]s is plain segment equality.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A path relative to the publish root, held as its segments.
///
/// The canonical string form joins segments with `/` whatever the host
/// separator is; that string is used both as the archive entry name and as the
/// storage key suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Splits on both `/` and `\`, so `a\b/c.html` and `a/b/c.html` are equal.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split(['/', '\\']))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, or `""` for the empty path.
    pub fn file_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    pub fn to_key_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key_string())
    }
}

impl From<&str> for RelativePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Absolute form of `path` with `.` dropped and `..` folded lexically.
/// Symlinks are not resolved and the path need not exist.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// `path` expressed relative to `root`. Paths outside the root get leading
/// `..` segments; `root` itself maps to the empty path.
pub fn relativize(root: &Path, path: &Path) -> io::Result<RelativePath> {
    let root = normalize(root)?;
    let path = normalize(path)?;
    let root_parts: Vec<Component<'_>> = root.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();

    let common = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments = vec!["..".to_string(); root_parts.len() - common];
    segments.extend(
        path_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    Ok(RelativePath::new(segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dot_segments() {
        let normalized = normalize(Path::new("/srv/build/./reports/../logs/x.log")).unwrap();
        assert_eq!(normalized, PathBuf::from("/srv/build/logs/x.log"));
    }

    #[test]
    fn normalize_makes_relative_paths_absolute() {
        let normalized = normalize(Path::new("reports/index.html")).unwrap();
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("reports/index.html"));
    }

    #[test]
    fn relativize_nested_path() {
        let rel = relativize(Path::new("/srv/build"), Path::new("/srv/build/reports/tests/index.html"))
            .unwrap();
        assert_eq!(rel.segments(), ["reports", "tests", "index.html"]);
        assert_eq!(rel.to_key_string(), "reports/tests/index.html");
        assert_eq!(rel.file_name(), "index.html");
    }

    #[test]
    fn relativize_root_is_empty() {
        let rel = relativize(Path::new("/srv/build/"), Path::new("/srv/build/.")).unwrap();
        assert!(rel.is_empty());
        assert_eq!(rel.to_string(), "");
        assert_eq!(rel.file_name(), "");
    }

    #[test]
    fn relativize_outside_root_uses_parent_segments() {
        let rel = relativize(Path::new("/srv/build/a"), Path::new("/srv/other/b.txt")).unwrap();
        assert_eq!(rel.to_key_string(), "../../other/b.txt");
    }

    #[test]
    fn relativize_ignores_dot_segments_in_either_input() {
        let a = relativize(Path::new("/srv/build"), Path::new("/srv/build/out/../out/a.html")).unwrap();
        let b = relativize(Path::new("/srv/./build"), Path::new("/srv/build/out/a.html")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parse_accepts_mixed_separators() {
        let a = RelativePath::parse("reports\\tests/index.html");
        let b = RelativePath::from("reports/tests/index.html");
        assert_eq!(a, b);
        assert_eq!(a.to_key_string(), "reports/tests/index.html");
    }

    #[test]
    fn join_appends_a_segment() {
        let base = RelativePath::parse("reports/tests");
        assert_eq!(base.join("tests.zip").to_key_string(), "reports/tests/tests.zip");
        assert_eq!(RelativePath::default().join(".zip").to_key_string(), ".zip");
    }
}
