//! CLI argument parsing
//!
//! Defines command-line interface using clap. Every flag is optional; with
//! no arguments the grader runs `./serial` and `./parallel` over `tests`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::GraderConfig;
use crate::error::GraderError;
use crate::output::OutputFormat;

/// Grade a parallel program against its serial reference
#[derive(Parser, Debug)]
#[command(name = "parity-grader")]
#[command(version)]
#[command(about = "Compare a parallel program's output against a serial reference")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Reference executable
    #[arg(long, global = true)]
    pub serial: Option<PathBuf>,

    /// Executable under test
    #[arg(long, global = true)]
    pub parallel: Option<PathBuf>,

    /// Directory of test input files
    #[arg(long, global = true)]
    pub tests_dir: Option<PathBuf>,

    /// Parallel runs per test case
    #[arg(short, long, global = true)]
    pub repeat: Option<u32>,

    /// Points awarded per passing test case
    #[arg(long, global = true)]
    pub points: Option<u32>,

    /// Per-invocation timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format (text, json)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Config file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Run every test case and print the grade (default)
    #[default]
    Grade,

    /// List test cases in grading order
    List,
}

impl Args {
    /// Overlay flags given on the command line onto `config`
    pub fn apply(&self, mut config: GraderConfig) -> Result<GraderConfig, GraderError> {
        if let Some(serial) = &self.serial {
            config.serial = serial.clone();
        }
        if let Some(parallel) = &self.parallel {
            config.parallel = parallel.clone();
        }
        if let Some(dir) = &self.tests_dir {
            config.tests_dir = dir.clone();
        }
        if let Some(repeat) = self.repeat {
            config.repeat_count = repeat;
        }
        if let Some(points) = self.points {
            config.points_per_test = points;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }
        if let Some(format) = &self.format {
            config.format = OutputFormat::from_str(format)
                .ok_or_else(|| GraderError::InvalidConfig(format!("unknown format: {format}")))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::parse_from(["parity-grader"]);
        assert!(args.command.is_none());

        let config = args.apply(GraderConfig::default()).unwrap();
        assert_eq!(config, GraderConfig::default());
    }

    #[test]
    fn test_list_with_global_flags() {
        let args = Args::parse_from(["parity-grader", "list", "--tests-dir", "cases"]);
        assert_eq!(args.command, Some(Command::List));
        assert_eq!(args.tests_dir, Some(PathBuf::from("cases")));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "parity-grader",
            "--parallel",
            "./build/parallel",
            "--repeat",
            "20",
            "--timeout",
            "2",
            "--format",
            "json",
        ]);
        let config = args.apply(GraderConfig::default()).unwrap();
        assert_eq!(config.parallel, PathBuf::from("./build/parallel"));
        assert_eq!(config.repeat_count, 20);
        assert_eq!(config.timeout_secs, Some(2));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.points_per_test, 5);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let args = Args::parse_from(["parity-grader", "--format", "xml"]);
        assert!(args.apply(GraderConfig::default()).is_err());
    }
}
