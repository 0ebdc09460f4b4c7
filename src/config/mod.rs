//! Configuration module
//!
//! Layers, lowest precedence first: built-in defaults, config file,
//! `PARITY_GRADER_*` environment variables, command-line flags.

mod env;
mod file;

pub use env::EnvConfig;
pub use file::{expand_path, find_config_file};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::GraderError;
use crate::output::OutputFormat;

/// Parallel invocations per test case
pub const DEFAULT_REPEAT_COUNT: u32 = 100;

/// Points awarded for a passing test case
pub const DEFAULT_POINTS_PER_TEST: u32 = 5;

pub const DEFAULT_SERIAL: &str = "./serial";
pub const DEFAULT_PARALLEL: &str = "./parallel";
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// Grader configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    /// Reference executable
    pub serial: PathBuf,

    /// Executable under test
    pub parallel: PathBuf,

    /// Directory holding one file per test case
    pub tests_dir: PathBuf,

    /// Parallel invocations per test case
    pub repeat_count: u32,

    /// Points for a passing test case
    pub points_per_test: u32,

    /// Per-invocation timeout in seconds, unlimited when unset
    pub timeout_secs: Option<u64>,

    /// Report format
    pub format: OutputFormat,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            serial: PathBuf::from(DEFAULT_SERIAL),
            parallel: PathBuf::from(DEFAULT_PARALLEL),
            tests_dir: PathBuf::from(DEFAULT_TESTS_DIR),
            repeat_count: DEFAULT_REPEAT_COUNT,
            points_per_test: DEFAULT_POINTS_PER_TEST,
            timeout_secs: None,
            format: OutputFormat::Text,
        }
    }
}

impl GraderConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(serial) = &env.serial {
            self.serial = PathBuf::from(serial);
        }
        if let Some(parallel) = &env.parallel {
            self.parallel = PathBuf::from(parallel);
        }
        if let Some(dir) = &env.tests_dir {
            self.tests_dir = PathBuf::from(dir);
        }
        if let Some(repeat) = env.repeat {
            self.repeat_count = repeat;
        }
        if let Some(points) = env.points {
            self.points_per_test = points;
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = Some(timeout);
        }
        if let Some(format) = env.format {
            self.format = format;
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), GraderError> {
        if self.repeat_count == 0 {
            return Err(GraderError::InvalidConfig(
                "repeat_count must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(GraderError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
