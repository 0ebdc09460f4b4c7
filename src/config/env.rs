//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::str::FromStr;

use crate::error::GraderError;
use crate::output::OutputFormat;

/// Environment variable prefix
const ENV_PREFIX: &str = "PARITY_GRADER";

/// Overrides read from `PARITY_GRADER_*` variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// PARITY_GRADER_SERIAL
    pub serial: Option<String>,
    /// PARITY_GRADER_PARALLEL
    pub parallel: Option<String>,
    /// PARITY_GRADER_TESTS_DIR
    pub tests_dir: Option<String>,
    /// PARITY_GRADER_REPEAT
    pub repeat: Option<u32>,
    /// PARITY_GRADER_POINTS
    pub points: Option<u32>,
    /// PARITY_GRADER_TIMEOUT
    pub timeout: Option<u64>,
    /// PARITY_GRADER_FORMAT
    pub format: Option<OutputFormat>,
    /// PARITY_GRADER_VERBOSE
    pub verbose: Option<bool>,
    /// PARITY_GRADER_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, GraderError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Values that do not parse are rejected, as the matching CLI flags are.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GraderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        let format = match get("FORMAT") {
            Some(value) => Some(
                OutputFormat::from_str(&value)
                    .ok_or_else(|| invalid("FORMAT", &value, "unknown format"))?,
            ),
            None => None,
        };

        Ok(Self {
            serial: get("SERIAL"),
            parallel: get("PARALLEL"),
            tests_dir: get("TESTS_DIR"),
            repeat: parse_opt("REPEAT", get("REPEAT"))?,
            points: parse_opt("POINTS", get("POINTS"))?,
            timeout: parse_opt("TIMEOUT", get("TIMEOUT"))?,
            format,
            verbose: get("VERBOSE").map(|v| parse_bool(&v)),
            config_file: get("CONFIG"),
        })
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

fn invalid(name: &str, value: &str, reason: &str) -> GraderError {
    GraderError::InvalidConfig(format!("{ENV_PREFIX}_{name}={value}: {reason}"))
}

fn parse_opt<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, GraderError> {
    value
        .map(|v| v.trim().parse().map_err(|_| invalid(name, &v, "not a valid number")))
        .transpose()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}
