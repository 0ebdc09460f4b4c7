//! Grader
//!
//! Runs the serial program once for a reference output, then the parallel
//! program up to `repeat_count` times, failing on the first run whose output
//! differs. Everything is sequential: one child process at a time.

use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::discovery::discover_tests;
use super::runner::{ProgramRunner, RunStatus};
use crate::config::GraderConfig;
use crate::error::{GraderError, GraderResult};
use crate::models::{GradeReport, TestCase, TestGrade, Verdict};
use crate::output::ReportFormatter;
use crate::utils::Timer;

/// Result of comparing one test case
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub verdict: Verdict,
    /// Parallel invocations issued
    pub parallel_runs: u32,
}

/// Grades the parallel program against the serial one
pub struct Grader<R> {
    runner: R,
    serial: PathBuf,
    parallel: PathBuf,
    tests_dir: PathBuf,
    repeat_count: u32,
    points_per_test: u32,
}

impl<R: ProgramRunner> Grader<R> {
    pub fn new(config: &GraderConfig, runner: R) -> Self {
        Self {
            runner,
            serial: config.serial.clone(),
            parallel: config.parallel.clone(),
            tests_dir: config.tests_dir.clone(),
            repeat_count: config.repeat_count,
            points_per_test: config.points_per_test,
        }
    }

    /// Check that both executables exist before anything is run
    pub fn preflight(&self) -> GraderResult<()> {
        self.runner.check(&self.serial)?;
        self.runner.check(&self.parallel)
    }

    pub fn discover(&self) -> GraderResult<Vec<TestCase>> {
        discover_tests(&self.tests_dir)
    }

    /// Compare the parallel program against the serial reference.
    ///
    /// Errors only when a program cannot be launched.
    pub async fn compare(&self, test_case: &TestCase) -> GraderResult<Comparison> {
        let reference = self.runner.run(&self.serial, test_case).await?;
        debug!(
            "{}: serial reference in {}ms",
            test_case, reference.duration_ms
        );

        match reference.status {
            RunStatus::TimedOut => {
                return Ok(Comparison {
                    verdict: Verdict::TimedOut { iteration: 0 },
                    parallel_runs: 0,
                });
            }
            RunStatus::Failed(code) => {
                warn!(
                    "{} exited unsuccessfully ({:?}) on {}, using its output as reference",
                    self.serial.display(),
                    code,
                    test_case
                );
            }
            RunStatus::Success => {}
        }

        for iteration in 1..=self.repeat_count {
            let output = self.runner.run(&self.parallel, test_case).await?;

            let matched = output.status != RunStatus::TimedOut && output.stdout == reference.stdout;
            if matched {
                continue;
            }

            let verdict = match output.status {
                RunStatus::TimedOut => Verdict::TimedOut { iteration },
                RunStatus::Failed(exit_code) => Verdict::Crashed {
                    iteration,
                    exit_code,
                },
                RunStatus::Success => Verdict::Mismatch { iteration },
            };
            debug!(
                "{}: {} (expected {:?}, got {:?})",
                test_case, verdict, reference.stdout, output.stdout
            );
            return Ok(Comparison {
                verdict,
                parallel_runs: iteration,
            });
        }

        Ok(Comparison {
            verdict: Verdict::Passed,
            parallel_runs: self.repeat_count,
        })
    }

    pub async fn grade(&self, test_case: TestCase) -> GraderResult<TestGrade> {
        let timer = Timer::start(test_case.to_string());
        let comparison = self.compare(&test_case).await?;

        if !comparison.verdict.passed() {
            info!("{}: {}", test_case, comparison.verdict);
        }

        Ok(TestGrade::new(
            test_case,
            comparison.verdict,
            self.points_per_test,
            comparison.parallel_runs,
            timer.stop_ms(),
        ))
    }

    /// Grade every discovered test case, writing each line as it completes.
    ///
    /// Nothing is written if the executables or the tests directory are
    /// missing.
    pub async fn grade_all(
        &self,
        out: &mut impl Write,
        formatter: &ReportFormatter,
    ) -> GraderResult<GradeReport> {
        self.preflight()?;
        let test_cases = self.discover()?;

        info!(
            "Grading {} test cases ({} parallel runs each)",
            test_cases.len(),
            self.repeat_count
        );

        let mut report = GradeReport::new(self.points_per_test);
        for test_case in test_cases {
            let grade = self.grade(test_case).await?;
            let grade = report.record(grade);
            formatter
                .write_grade(out, grade)
                .map_err(GraderError::Output)?;
        }

        formatter
            .write_report(out, &report)
            .map_err(GraderError::Output)?;

        info!(
            "Graded {} test cases: {} passed, {} failed ({:.1}%), score {}/{}",
            report.grades.len(),
            report.passed(),
            report.failed(),
            report.pass_rate(),
            report.total,
            report.max_total()
        );

        Ok(report)
    }
}
