//! Report formatters
//!
//! Text output streams one line per test case as soon as it is graded,
//! followed by the total. JSON output prints the whole report at the end.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::models::{GradeReport, TestGrade};

/// Dots between the test path and its result
const LEADER: &str = "........................";

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Report formatter
#[derive(Clone, Copy, Debug)]
pub struct ReportFormatter {
    format: OutputFormat,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format the line printed for a single graded test case
    pub fn format_grade(&self, grade: &TestGrade) -> String {
        let outcome = if grade.passed() { "passed" } else { "failed" };
        format!(
            "Test: {} {} {} ({}/{})",
            grade.test_case, LEADER, outcome, grade.points, grade.max_points
        )
    }

    pub fn format_total(&self, report: &GradeReport) -> String {
        format!("Total: {}", report.total)
    }

    /// Write the per-test line immediately, if this format streams
    pub fn write_grade(&self, out: &mut impl Write, grade: &TestGrade) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(out, "{}", self.format_grade(grade))?;
                out.flush()
            }
            OutputFormat::Json => Ok(()),
        }
    }

    /// Write whatever closes the report
    pub fn write_report(&self, out: &mut impl Write, report: &GradeReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(out, "{}", self.format_total(report))?,
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
                writeln!(out, "{json}")?;
            }
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TestCase, Verdict};

    fn grade(name: &str, verdict: Verdict) -> TestGrade {
        TestGrade::new(TestCase::new("tests", name), verdict, 5, 100, 12)
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_passed_line() {
        let formatter = ReportFormatter::new(OutputFormat::Text);
        assert_eq!(
            formatter.format_grade(&grade("t1", Verdict::Passed)),
            "Test: tests/t1 ........................ passed (5/5)"
        );
    }

    #[test]
    fn test_failed_line() {
        let formatter = ReportFormatter::new(OutputFormat::Text);
        let failed = grade("t22", Verdict::Crashed {
            iteration: 1,
            exit_code: Some(1),
        });
        assert_eq!(
            formatter.format_grade(&failed),
            "Test: tests/t22 ........................ failed (0/5)"
        );
    }

    #[test]
    fn test_text_report() {
        let formatter = ReportFormatter::new(OutputFormat::Text);
        let mut report = GradeReport::new(5);
        let mut out = Vec::new();

        for g in [
            grade("a", Verdict::Passed),
            grade("b", Verdict::Mismatch { iteration: 2 }),
            grade("c", Verdict::Passed),
        ] {
            let recorded = report.record(g);
            formatter.write_grade(&mut out, recorded).unwrap();
        }
        formatter.write_report(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Test: tests/a ........................ passed (5/5)\n\
             Test: tests/b ........................ failed (0/5)\n\
             Test: tests/c ........................ passed (5/5)\n\
             Total: 10\n"
        );
    }

    #[test]
    fn test_json_report_only_at_end() {
        let formatter = ReportFormatter::new(OutputFormat::Json);
        let mut report = GradeReport::new(5);
        let mut out = Vec::new();

        let recorded = report.record(grade("a", Verdict::TimedOut { iteration: 0 }));
        formatter.write_grade(&mut out, recorded).unwrap();
        assert!(out.is_empty());

        formatter.write_report(&mut out, &report).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["grades"][0]["verdict"]["status"], "timed_out");
        assert_eq!(json["grades"][0]["test_case"]["path"], "tests/a");
    }
}
