//! Grade models
//!
//! Defines per-test verdicts and the report accumulated over a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::TestCase;

/// Outcome of comparing the parallel program against the serial one.
///
/// `iteration` 0 is the serial reference run; parallel runs count from 1.
/// Only text equality decides pass or fail. The failure variants label the
/// first differing run for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Mismatch { iteration: u32 },
    Crashed { iteration: u32, exit_code: Option<i32> },
    TimedOut { iteration: u32 },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "passed"),
            Verdict::Mismatch { iteration } => write!(f, "output mismatch on run {iteration}"),
            Verdict::Crashed {
                iteration,
                exit_code: Some(code),
            } => write!(f, "exited with code {code} on run {iteration}"),
            Verdict::Crashed {
                iteration,
                exit_code: None,
            } => write!(f, "killed by signal on run {iteration}"),
            Verdict::TimedOut { iteration } => write!(f, "timed out on run {iteration}"),
        }
    }
}

/// Grade of a single test case
#[derive(Clone, Debug, Serialize)]
pub struct TestGrade {
    pub test_case: TestCase,
    pub verdict: Verdict,
    pub points: u32,
    pub max_points: u32,
    /// Parallel invocations actually issued before the verdict was reached
    pub parallel_runs: u32,
    pub duration_ms: u64,
}

impl TestGrade {
    pub fn new(
        test_case: TestCase,
        verdict: Verdict,
        max_points: u32,
        parallel_runs: u32,
        duration_ms: u64,
    ) -> Self {
        let points = if verdict.passed() { max_points } else { 0 };
        Self {
            test_case,
            verdict,
            points,
            max_points,
            parallel_runs,
            duration_ms,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

/// Ordered grades of one run plus the running total
#[derive(Clone, Debug, Serialize)]
pub struct GradeReport {
    pub started_at: DateTime<Utc>,
    pub points_per_test: u32,
    pub total: u64,
    pub grades: Vec<TestGrade>,
}

impl GradeReport {
    pub fn new(points_per_test: u32) -> Self {
        Self {
            started_at: Utc::now(),
            points_per_test,
            total: 0,
            grades: Vec::new(),
        }
    }

    /// Append a grade and add its points to the total
    pub fn record(&mut self, grade: TestGrade) -> &TestGrade {
        self.total += u64::from(grade.points);
        self.grades.push(grade);
        &self.grades[self.grades.len() - 1]
    }

    pub fn passed(&self) -> usize {
        self.grades.iter().filter(|g| g.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.grades.len() - self.passed()
    }

    pub fn max_total(&self) -> u64 {
        self.grades.iter().map(|g| u64::from(g.max_points)).sum()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.grades.is_empty() {
            0.0
        } else {
            (self.passed() as f64 / self.grades.len() as f64) * 100.0
        }
    }
}
