#![forbid(unsafe_code)]

//! Rule file parsing
//!
//! One rule file configures one model. File layout, in order:
//!
//! ```text
//! T1_1 : (0008,0060) Modality == "MR"     # atom
//! C1_1 : T1_1 && ~T1_2                    # combinator
//! Trigger : C1_1
//! ModelName: "Prostate_MRL"               # routing config from here on
//! ```
//!
//! The `Trigger` line switches parsing mode permanently: every line before it
//! must be an atom or combinator, every line after it is a routing entry.
//! A RuleSet is built once per rule file per load and is immutable
//! thereafter, so it can be shared across evaluations without
//! synchronization.

use crate::error::{CompletenessError, FormatError, GateError};
use crate::rules::atom::Atom;
use crate::rules::expr::Expr;
use crate::rules::routing::RoutingConfig;
use crate::types::RuleName;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// A named boolean expression built from atoms and earlier combinators
#[derive(Debug, Clone, PartialEq)]
pub struct Combinator {
    pub name: RuleName,
    pub expr: Expr,
}

/// A fully parsed rule file: atoms, combinators, trigger, routing config
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    atoms: Vec<Atom>,
    combinators: Vec<Combinator>,
    trigger: Expr,
    routing: RoutingConfig,
}

fn atom_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^T\d+_\d+").expect("atom start regex is valid"))
}

fn combinator_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^C\d+_\d+").expect("combinator start regex is valid"))
}

fn trigger_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Trigger\s*:").expect("trigger start regex is valid"))
}

/// Strips the comment, normalizes tabs to spaces, and trims
fn preprocess(line: &str) -> String {
    let line = match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    };
    line.replace('\t', " ").trim().to_string()
}

/// Parses and reference-checks one combinator or trigger expression
fn parse_checked_expr(
    name: &str,
    expr_text: &str,
    defined: &HashSet<RuleName>,
) -> Result<Expr, GateError> {
    let expr = Expr::parse(expr_text).ok_or_else(|| FormatError::InvalidExpression {
        name: name.to_string(),
        expr: expr_text.trim().to_string(),
    })?;

    let mut undefined = None;
    expr.for_each_name(&mut |reference| {
        if undefined.is_none() && !defined.contains(reference) {
            undefined = Some(reference.clone());
        }
    });
    if let Some(reference) = undefined {
        return Err(CompletenessError::UndefinedReference {
            name: name.to_string(),
            reference: reference.to_string(),
        }
        .into());
    }
    Ok(expr)
}

impl RuleSet {
    /// Parses rule-file text into an immutable RuleSet
    ///
    /// Format errors identify the offending line; completeness errors are
    /// raised once the full file has been read.
    pub fn parse(text: &str) -> Result<RuleSet, GateError> {
        let mut atoms: Vec<Atom> = Vec::new();
        let mut combinators: Vec<Combinator> = Vec::new();
        let mut trigger: Option<Expr> = None;
        let mut routing = RoutingConfig::new();
        let mut defined: HashSet<RuleName> = HashSet::new();

        for raw_line in text.lines() {
            let line = preprocess(raw_line);
            if line.is_empty() {
                continue;
            }

            if trigger.is_some() {
                // Routing-config mode: every remaining line is Key: value
                let (key, value) = line
                    .split_once(':')
                    .ok_or_else(|| FormatError::MissingSeparator(line.clone()))?;
                routing.push(key, value)?;
                continue;
            }

            if atom_start_regex().is_match(&line) {
                let atom = Atom::parse_line(&line)?;
                if !defined.insert(atom.name.clone()) {
                    return Err(CompletenessError::DuplicateName(atom.name.to_string()).into());
                }
                atoms.push(atom);
            } else if combinator_start_regex().is_match(&line) {
                let (name_text, expr_text) = line
                    .split_once(':')
                    .ok_or_else(|| FormatError::UnrecognizedLine(line.clone()))?;
                let name = RuleName::new(name_text.trim())
                    .ok_or_else(|| FormatError::UnrecognizedLine(line.clone()))?;
                let expr = parse_checked_expr(name.as_str(), expr_text, &defined)?;
                if !defined.insert(name.clone()) {
                    return Err(CompletenessError::DuplicateName(name.to_string()).into());
                }
                combinators.push(Combinator { name, expr });
            } else if trigger_start_regex().is_match(&line) {
                let (_, expr_text) = line
                    .split_once(':')
                    .ok_or_else(|| FormatError::UnrecognizedLine(line.clone()))?;
                trigger = Some(parse_checked_expr("Trigger", expr_text, &defined)?);
            } else {
                return Err(FormatError::UnrecognizedLine(line).into());
            }
        }

        let trigger = trigger.ok_or(CompletenessError::MissingTrigger)?;
        routing.validate_completeness()?;

        Ok(RuleSet {
            atoms,
            combinators,
            trigger,
            routing,
        })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Combinators in declaration order; each may reference atoms and
    /// earlier combinators only
    pub fn combinators(&self) -> &[Combinator] {
        &self.combinators
    }

    pub fn trigger(&self) -> &Expr {
        &self.trigger
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    /// The configured model name
    pub fn model_name(&self) -> &str {
        // Completeness validation guarantees the key exists and is non-empty
        self.routing.get("ModelName").unwrap_or_default()
    }
}
