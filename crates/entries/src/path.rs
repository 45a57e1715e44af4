//! Directory paths and entry names.
//!
//! A directory path starts and ends with `/`; the root is exactly `/`.
//! Between the outer separators it is a `/`-joined list of non-empty
//! segment names.

use std::fmt;

use crate::error::{Result, TreeError};

pub const SEPARATOR: char = '/';

/// A validated directory path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DirPath {
    segments: Vec<String>,
}

impl DirPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path reported back to the caller under `field`.
    ///
    /// ```
    /// use entries::DirPath;
    ///
    /// let path = DirPath::parse("dir", "/a/b/").unwrap();
    /// assert_eq!(path.segments(), ["a", "b"]);
    /// assert!(DirPath::parse("dir", "/").unwrap().segments().is_empty());
    /// assert!(DirPath::parse("dir", "/a").is_err());
    /// ```
    pub fn parse(field: &'static str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(TreeError::invalid(field, "path is empty"));
        }
        if !raw.starts_with(SEPARATOR) {
            return Err(TreeError::invalid(
                field,
                format!("path {raw:?} must begin with '/'"),
            ));
        }
        if !raw.ends_with(SEPARATOR) {
            return Err(TreeError::invalid(
                field,
                format!("path {raw:?} must end with '/'"),
            ));
        }
        if raw.len() == 1 {
            return Ok(Self::root());
        }

        let inner = &raw[1..raw.len() - 1];
        let mut segments = Vec::new();
        for segment in inner.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(TreeError::invalid(
                    field,
                    format!("path {raw:?} contains an empty segment"),
                ));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for segment in &self.segments {
            write!(f, "{segment}/")?;
        }
        Ok(())
    }
}

/// Checks a name used as a path segment or a new entry's name.
pub fn validate_entry_name(field: &'static str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TreeError::invalid(field, "name is empty"));
    }
    if name.contains(SEPARATOR) {
        return Err(TreeError::invalid(
            field,
            format!("name {name:?} contains '/'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(result: Result<DirPath>) -> &'static str {
        match result {
            Err(TreeError::InvalidParameter { field, .. }) => field,
            other => panic!("expected invalid parameter, got {other:?}"),
        }
    }

    #[test]
    fn parses_root() {
        let path = DirPath::parse("dir", "/").expect("root");
        assert!(path.segments().is_empty());
        assert_eq!(path.to_string(), "/");
    }

    #[test]
    fn parses_nested_path() {
        let path = DirPath::parse("dir", "/a/b/c/").expect("nested");
        assert_eq!(path.segments(), ["a", "b", "c"]);
        assert_eq!(path.to_string(), "/a/b/c/");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(invalid_field(DirPath::parse("dir", "")), "dir");
        assert_eq!(invalid_field(DirPath::parse("dir", "dir/")), "dir");
        assert_eq!(invalid_field(DirPath::parse("dir", "/dir")), "dir");
        assert_eq!(invalid_field(DirPath::parse("dir", "//")), "dir");
        assert_eq!(invalid_field(DirPath::parse("dir", "/a//b/")), "dir");
    }

    #[test]
    fn validates_entry_names() {
        assert!(validate_entry_name("entry.name", "report.v2").is_ok());
        assert!(validate_entry_name("entry.name", "").is_err());
        assert!(matches!(
            validate_entry_name("entry.name", "entry_name_contains_/"),
            Err(TreeError::InvalidParameter { field: "entry.name", .. })
        ));
    }
}
