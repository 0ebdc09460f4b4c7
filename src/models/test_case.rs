//! Test case model
//!
//! A test case is one input file. Its contents are never inspected; the path
//! is handed to both programs as their only argument.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// One entry of the tests directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Entry name for display and ordering, lossy for non-UTF-8 names
    pub name: String,
    /// Path handed to the programs, exact even when `name` is lossy
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
}

fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl TestCase {
    #[cfg(test)]
    pub fn new(dir: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = dir.as_ref().join(&name);
        Self { name, path }
    }

    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Grading order: shorter names first, then lexicographic.
    pub fn sort_key(&self) -> (usize, &str) {
        (self.name.chars().count(), self.name.as_str())
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_path_joins_dir() {
        let case = TestCase::new("tests", "t1");
        assert_eq!(case.path, PathBuf::from("tests/t1"));
        assert_eq!(case.to_string(), "tests/t1");
    }

    #[test]
    fn test_from_path_keeps_exact_path() {
        let case = TestCase::from_path(PathBuf::from("tests/t22"));
        assert_eq!(case.name, "t22");
        assert_eq!(case, TestCase::new("tests", "t22"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_serializes_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let case = TestCase::from_path(Path::new("tests").join(OsStr::from_bytes(b"t\xff")));
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["path"], "tests/t\u{fffd}");
        assert_eq!(json["name"], "t\u{fffd}");
    }

    #[test]
    fn test_sort_key_counts_chars() {
        let case = TestCase::new("tests", "é");
        assert_eq!(case.sort_key(), (1, "é"));
    }
}
