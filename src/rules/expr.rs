#![forbid(unsafe_code)]

//! The logical expression grammar shared by rule-file validation and trigger
//! evaluation
//!
//! ```text
//! Expr := Name | '~' Expr | '(' Expr ')' | Expr '&&' Expr | Expr '||' Expr
//! ```
//!
//! The grammar is deliberately not precedence-based. An expression is split at
//! the *leftmost* `&&`/`||` occurrence whose parenthesis counts balance on
//! both sides, so `A && B || C` parses as `A && (B || C)`. Rule files in the
//! field depend on this grouping; it must not be replaced with conventional
//! `&&`-before-`||` precedence.
//!
//! Expressions are parsed into an AST once per rule file and evaluated
//! directly against a name→bool environment. Evaluation mirrors the legacy
//! substitute-then-evaluate model: every name is resolved before any boolean
//! logic runs, so an undefined name anywhere in the expression poisons the
//! whole result to `false`. Evaluation never fails.

use crate::types::RuleName;
use std::collections::HashMap;
use std::fmt;

/// A parsed logical expression over atom and combinator names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Name(RuleName),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// The two binary operators, as found by the splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
}

impl Expr {
    /// Parses an expression string, or returns None if it does not satisfy
    /// the grammar
    ///
    /// Structural cases are tried in a fixed order: bare name, leading `~`
    /// (which applies to the whole remainder), fully parenthesized group,
    /// then the leftmost eligible binary operator.
    pub fn parse(input: &str) -> Option<Expr> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        if let Some(name) = RuleName::new(s) {
            return Some(Expr::Name(name));
        }
        if let Some(rest) = s.strip_prefix('~') {
            return Expr::parse(rest).map(|e| Expr::Not(Box::new(e)));
        }
        if s.starts_with('(') && matching_paren(s) == Some(s.len() - 1) {
            return Expr::parse(&s[1..s.len() - 1]);
        }
        if let Some((index, op)) = first_eligible_operator(s) {
            let left = Expr::parse(&s[..index])?;
            let right = Expr::parse(&s[index + 2..])?;
            return Some(match op {
                BinOp::And => Expr::And(Box::new(left), Box::new(right)),
                BinOp::Or => Expr::Or(Box::new(left), Box::new(right)),
            });
        }
        None
    }

    /// Returns true if `input` satisfies the grammar
    pub fn is_valid(input: &str) -> bool {
        Expr::parse(input).is_some()
    }

    /// Evaluates against a name→bool environment, degrading any failure to
    /// `false`
    ///
    /// Name substitution happens before any boolean logic, so an undefined
    /// name anywhere in the expression yields `false` for the whole
    /// expression, even in a branch that short-circuiting would skip.
    pub fn evaluate(&self, env: &HashMap<RuleName, bool>) -> bool {
        let mut undefined = false;
        self.for_each_name(&mut |name| {
            if !env.contains_key(name) {
                undefined = true;
            }
        });
        if undefined {
            tracing::debug!(expr = %self, "expression references an undefined name, evaluating to false");
            return false;
        }
        self.eval_resolved(env)
    }

    /// Plain recursive evaluation; every name is known to resolve
    fn eval_resolved(&self, env: &HashMap<RuleName, bool>) -> bool {
        match self {
            Expr::Name(name) => env.get(name).copied().unwrap_or(false),
            Expr::Not(inner) => !inner.eval_resolved(env),
            Expr::And(left, right) => left.eval_resolved(env) && right.eval_resolved(env),
            Expr::Or(left, right) => left.eval_resolved(env) || right.eval_resolved(env),
        }
    }

    /// Visits every name referenced by this expression, left to right
    pub fn for_each_name<'a>(&'a self, f: &mut impl FnMut(&'a RuleName)) {
        match self {
            Expr::Name(name) => f(name),
            Expr::Not(inner) => inner.for_each_name(f),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.for_each_name(f);
                right.for_each_name(f);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Not(inner) => write!(f, "~{inner}"),
            Expr::And(left, right) => write!(f, "({left} && {right})"),
            Expr::Or(left, right) => write!(f, "({left} || {right})"),
        }
    }
}

/// Finds the byte index where the opening parenthesis at index 0 is matched
///
/// Scans forward maintaining a depth counter; the index where the counter
/// returns to zero is the match. Returns None for an unmatched bracket.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds the leftmost `&&`/`||` occurrence whose parenthesis counts balance
/// on both sides of the split
fn first_eligible_operator(s: &str) -> Option<(usize, BinOp)> {
    let bytes = s.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        let op = match &bytes[i..i + 2] {
            b"&&" => BinOp::And,
            b"||" => BinOp::Or,
            _ => continue,
        };
        if balanced(&bytes[..i]) && balanced(&bytes[i + 2..]) {
            return Some((i, op));
        }
    }
    None
}

/// True if the open- and close-parenthesis counts in `bytes` are equal
fn balanced(bytes: &[u8]) -> bool {
    let opens = bytes.iter().filter(|&&b| b == b'(').count();
    let closes = bytes.iter().filter(|&&b| b == b')').count();
    opens == closes
}
