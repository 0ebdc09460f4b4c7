//! parity-grader - serial/parallel output comparison harness
//!
//! Runs a reference program (`serial`) and a program under test
//! (`parallel`) against every file in a tests directory. The parallel
//! program is run repeatedly per test to surface nondeterminism; a test
//! earns its points only if every run prints exactly what the serial
//! program printed.
//!
//! ## Usage
//!
//! ```bash
//! # Grade ./parallel against ./serial over ./tests
//! parity-grader
//!
//! # Fewer repetitions, with a per-run timeout
//! parity-grader --repeat 10 --timeout 5
//!
//! # Show the order tests will run in
//! parity-grader list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

mod cli;
mod config;
mod error;
mod executor;
mod models;
mod output;
mod utils;

use cli::{Args, Command};
use config::{find_config_file, EnvConfig, GraderConfig};
use executor::{discover_tests, Grader, ProcessRunner};
use output::ReportFormatter;
use utils::{init_logger, LogLevel};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load().context("Invalid environment configuration")?;

    init_logger(LogLevel::from_verbose(args.verbose || env.is_verbose()));

    let config = load_config(&args, &env)?;
    debug!("Effective configuration: {:?}", config);

    match args.command.unwrap_or_default() {
        Command::Grade => grade(&config).await,
        Command::List => list(&config),
    }
}

fn load_config(args: &Args, env: &EnvConfig) -> Result<GraderConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env.config_file.as_deref().map(config::expand_path))
        .or_else(find_config_file);

    let base = match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            GraderConfig::load(&path)?
        }
        None => GraderConfig::default(),
    };

    let config = args.apply(base.with_env(env))?;
    config.validate()?;
    Ok(config)
}

async fn grade(config: &GraderConfig) -> Result<()> {
    let grader = Grader::new(config, ProcessRunner::new(config.timeout()));
    let formatter = ReportFormatter::new(config.format);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    grader
        .grade_all(&mut out, &formatter)
        .await
        .context("Grading aborted")?;

    Ok(())
}

fn list(config: &GraderConfig) -> Result<()> {
    let test_cases = discover_tests(&config.tests_dir).context("Failed to list test cases")?;
    for test_case in test_cases {
        println!("{test_case}");
    }
    Ok(())
}
