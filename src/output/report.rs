#![forbid(unsafe_code)]

//! Report formatters for validation and evaluation results
//!
//! Human-readable reports are written through termcolor so verdicts stand out
//! on a terminal; JSON reports are serde-serialized for machine consumers.

use crate::engine::{TriggerDecision, Verdict};
use crate::error::GateError;
use crate::rules::RuleSet;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Outcome of validating one rule file
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub atoms: usize,
    pub combinators: usize,
    pub routing_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    /// Builds a passing report from a parsed ruleset
    pub fn from_ruleset(rules: &RuleSet) -> Self {
        ValidationReport {
            valid: true,
            model_name: Some(rules.model_name().to_string()),
            atoms: rules.atoms().len(),
            combinators: rules.combinators().len(),
            routing_entries: rules.routing().len(),
            error: None,
        }
    }

    /// Builds a failing report carrying the parse or completeness error
    pub fn from_error(error: &GateError) -> Self {
        ValidationReport {
            valid: false,
            model_name: None,
            atoms: 0,
            combinators: 0,
            routing_entries: 0,
            error: Some(error.to_string()),
        }
    }

    /// Writes the human-readable form
    pub fn write_human(&self, out: &mut impl WriteColor) -> io::Result<()> {
        if self.valid {
            write_colored(out, "VALID", Color::Green)?;
            writeln!(out)?;
            if let Some(name) = &self.model_name {
                writeln!(out, "  Model: {name}")?;
            }
            writeln!(out, "  Atoms: {}", self.atoms)?;
            writeln!(out, "  Combinators: {}", self.combinators)?;
            writeln!(out, "  Routing entries: {}", self.routing_entries)?;
        } else {
            write_colored(out, "INVALID", Color::Red)?;
            writeln!(out)?;
            if let Some(error) = &self.error {
                writeln!(out, "  {error}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of evaluating one series against one rule file
#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub model_name: String,
    pub per_image: Vec<bool>,
    pub triggered_count: usize,
    pub consecutive: Verdict,
    pub position_available: Verdict,
}

impl EvaluationReport {
    pub fn new(rules: &RuleSet, decision: &TriggerDecision) -> Self {
        EvaluationReport {
            model_name: rules.model_name().to_string(),
            per_image: decision.per_image.clone(),
            triggered_count: decision.triggered_count(),
            consecutive: decision.consecutive,
            position_available: decision.position_available,
        }
    }

    /// Writes the human-readable form
    pub fn write_human(&self, out: &mut impl WriteColor) -> io::Result<()> {
        writeln!(out, "Model: {}", self.model_name)?;
        write!(out, "Trigger: ")?;
        if self.triggered_count > 0 {
            write_colored(out, "fired", Color::Green)?;
            writeln!(
                out,
                " ({} of {} images)",
                self.triggered_count,
                self.per_image.len()
            )?;
        } else {
            write_colored(out, "not fired", Color::Red)?;
            writeln!(out, " (0 of {} images)", self.per_image.len())?;
        }

        write!(out, "  Per image: [")?;
        for (i, &triggered) in self.per_image.iter().enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}", if triggered { "yes" } else { "no" })?;
        }
        writeln!(out, "]")?;

        write!(out, "  Consecutive: ")?;
        write_verdict(out, self.consecutive)?;
        writeln!(out)?;
        write!(out, "  Position available: ")?;
        write_verdict(out, self.position_available)?;
        writeln!(out)?;
        Ok(())
    }
}

fn write_colored(out: &mut impl WriteColor, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{text}")?;
    out.reset()
}

fn write_verdict(out: &mut impl WriteColor, verdict: Verdict) -> io::Result<()> {
    match verdict {
        Verdict::Yes => write_colored(out, "yes", Color::Green),
        Verdict::No => write_colored(out, "no", Color::Red),
        Verdict::Unknown => write_colored(out, "unknown", Color::Yellow),
    }
}
