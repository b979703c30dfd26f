#![forbid(unsafe_code)]

//! Seriesgate: rule-driven trigger engine for medical-image series
//!
//! Seriesgate decides, per incoming batch of image metadata, whether a series
//! qualifies for automated processing by a named AI model. Rule files define
//! tag-test atoms, boolean combinators, one trigger expression, and routing
//! config; the evaluator applies them to per-image attribute records and adds
//! a spatial-consecutiveness check. A separate parser decodes the
//! semi-structured responses of the data-location query tool.
//!
//! The library performs no I/O; file reading and process exit codes live in
//! the CLI layer.

pub mod cli;
pub mod engine;
pub mod error;
pub mod output;
pub mod response;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{CompletenessError, FormatError, GateError, ResponseError};

// Re-export core domain types for convenient access
pub use engine::{TriggerDecision, Verdict, evaluate_series};
pub use response::{GenericValue, parse_response};
pub use rules::RuleSet;
pub use types::{AttributeRecord, AttributeValue, CmpOp, RuleName, TagKey};
