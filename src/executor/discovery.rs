//! Test case discovery

use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::{GraderError, GraderResult};
use crate::models::TestCase;

/// List every entry of `dir` (non-recursive) in grading order.
///
/// Entries are not filtered: sub-directories and dot-files are test cases
/// like any other file.
pub fn discover_tests(dir: &Path) -> GraderResult<Vec<TestCase>> {
    let io_error = |source: std::io::Error| GraderError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let entries = std::fs::read_dir(dir).map_err(|source| match source.kind() {
        ErrorKind::NotFound => GraderError::DirectoryNotFound(dir.to_path_buf()),
        _ => io_error(source),
    })?;

    let mut cases = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_error)?;
        cases.push(TestCase::from_path(entry.path()));
    }

    cases.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    debug!("Discovered {} test cases in {}", cases.len(), dir.display());
    Ok(cases)
}
