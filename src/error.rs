//! Error types for seriesgate
//!
//! This module defines the error types used throughout seriesgate, following
//! a hierarchical structure with specific error variants for different
//! error categories.
//!
//! Evaluation failures are deliberately absent from this taxonomy: the trigger
//! evaluator degrades every comparison or lookup failure to `false` for the
//! affected atom and never surfaces an error past the engine boundary.

/// Errors raised while parsing individual rule-file lines
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A line that should define an atom did not match the atom grammar
    #[error("Malformed atom line: {0}")]
    MalformedAtom(String),

    /// A combinator or trigger expression failed grammar validation
    #[error("Invalid logical expression for {name}: {expr}")]
    InvalidExpression { name: String, expr: String },

    /// A line before the trigger matched none of the recognized line forms
    #[error("Unrecognized line before Trigger: {0}")]
    UnrecognizedLine(String),

    /// A routing-config line had no key/value separator
    #[error("Routing line has no ':' separator: {0}")]
    MissingSeparator(String),

    /// A recognized routing key carried a value in the wrong literal format
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by whole-ruleset validation after all lines are read
#[derive(Debug, thiserror::Error)]
pub enum CompletenessError {
    /// A required routing key is missing or empty
    #[error("Missing required key: {0}")]
    MissingKey(String),

    /// No trigger line was found in the rule file
    #[error("Rule file defines no Trigger")]
    MissingTrigger,

    /// An atom or combinator name was defined twice
    #[error("Duplicate rule name: {0}")]
    DuplicateName(String),

    /// An expression referenced a name not defined earlier in the file
    #[error("Expression for {name} references undefined name {reference}")]
    UndefinedReference { name: String, reference: String },

    /// A DICOM node index is missing one or more of IP/Port/AET
    #[error("Return DICOM node {index} is incomplete: missing {missing}")]
    IncompleteDicomNode { index: String, missing: String },

    /// Neither a return directory nor a complete DICOM node exists
    #[error("Rule file defines no return target")]
    NoReturnTarget,
}

/// Errors raised while decoding a semi-structured query response
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The top level was not bracket-delimited by `[...]`
    #[error("Response is not delimited by outer brackets: {0}")]
    MissingOuterBrackets(String),

    /// An object segment contained no key/value separator
    #[error("Object segment has no ':' separator: {0}")]
    MissingSeparator(String),

    /// A scalar matched no recognized literal form
    #[error("Unrecognized scalar literal: {0}")]
    UnrecognizedScalar(String),

    /// A `Long(...)` wrapper did not contain a parseable number
    #[error("Long() wrapper does not contain a number: {0}")]
    InvalidLong(String),
}

/// Top-level error type for seriesgate
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Rule-file line format error
    #[error("Rule format error: {0}")]
    Format(#[from] FormatError),

    /// Rule-file completeness error
    #[error("Rule completeness error: {0}")]
    Completeness(#[from] CompletenessError),

    /// Response parsing error
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
