//! Error types for the grading harness
//!
//! Only configuration and launch problems are errors. A failing comparison,
//! a crashed child or a timed-out child is an outcome and lives in
//! [`crate::models::Verdict`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraderError {
    #[error("test directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type GraderResult<T> = std::result::Result<T, GraderError>;
