#![forbid(unsafe_code)]

//! Trigger evaluation engine

pub mod evaluator;

pub use evaluator::{TriggerDecision, Verdict, evaluate_series};
