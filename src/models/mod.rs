//! Data models for grading
//!
//! Test cases discovered on disk and the grades recorded for them.

mod grade;
mod test_case;

pub use grade::{GradeReport, TestGrade, Verdict};
pub use test_case::TestCase;
