#![forbid(unsafe_code)]

//! Output formatting for CLI reports

pub mod report;

pub use report::{EvaluationReport, ValidationReport};
