//! Test execution engine
//!
//! Discovers test cases, runs the serial and parallel programs against them
//! and grades the comparison.

mod discovery;
mod grader;
mod runner;

pub use discovery::discover_tests;
pub use grader::Grader;
pub use runner::ProcessRunner;
