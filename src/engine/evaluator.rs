#![forbid(unsafe_code)]

//! Trigger evaluation against a series of attribute records
//!
//! The evaluator applies one RuleSet to the ordered attribute records of a
//! series and produces a boolean per image plus two series-level verdicts:
//! whether the triggered images are spatially consecutive, and whether their
//! positions were available at all.
//!
//! Evaluation is fail-safe by policy: an absent tag, a type-mismatched
//! comparison, or an unparseable literal makes the affected atom false for
//! that record. The engine always prefers withholding a trigger over
//! crashing or mis-triggering; nothing in this module returns an error.

use crate::rules::RuleSet;
use crate::types::{AttributeRecord, AttributeValue, CmpOp, RuleName};
use serde::Serialize;
use std::collections::HashMap;

/// Observed spacing must stay within 1% of the mean adjacent spacing of its
/// expected arithmetic-progression slot.
const SPACING_TOLERANCE: f64 = 0.01;

/// A three-valued series-level verdict
///
/// `Unknown` when zero records triggered, so there was nothing to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Yes,
    No,
    Unknown,
}

impl Verdict {
    fn from_bool(b: bool) -> Self {
        if b { Verdict::Yes } else { Verdict::No }
    }
}

/// The outcome of evaluating one series against one RuleSet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerDecision {
    /// Trigger outcome per record, in input order
    pub per_image: Vec<bool>,
    /// Whether the triggered images form an evenly spaced stack
    pub consecutive: Verdict,
    /// Whether every triggered image carried a spatial position
    pub position_available: Verdict,
}

impl TriggerDecision {
    /// True if at least one image triggered
    pub fn any_triggered(&self) -> bool {
        self.per_image.iter().any(|&b| b)
    }

    /// Number of triggered images
    pub fn triggered_count(&self) -> usize {
        self.per_image.iter().filter(|&&b| b).count()
    }
}

/// Evaluates a RuleSet against the ordered records of one series
pub fn evaluate_series(rules: &RuleSet, records: &[AttributeRecord]) -> TriggerDecision {
    let per_image: Vec<bool> = records
        .iter()
        .map(|record| evaluate_record(rules, record))
        .collect();

    let triggered_positions: Option<Vec<f64>> = records
        .iter()
        .zip(&per_image)
        .filter(|&(_, &triggered)| triggered)
        .map(|(record, _)| record.third_position())
        .collect();

    let (consecutive, position_available) = if !per_image.iter().any(|&b| b) {
        (Verdict::Unknown, Verdict::Unknown)
    } else {
        match triggered_positions {
            None => (Verdict::No, Verdict::No),
            Some(mut positions) => {
                positions.sort_by(|a, b| a.total_cmp(b));
                (Verdict::from_bool(is_consecutive(&positions)), Verdict::Yes)
            }
        }
    };

    TriggerDecision {
        per_image,
        consecutive,
        position_available,
    }
}

/// Evaluates the trigger for one record: atoms first, combinators in
/// declaration order, then the trigger expression
fn evaluate_record(rules: &RuleSet, record: &AttributeRecord) -> bool {
    let mut env: HashMap<RuleName, bool> = HashMap::new();

    for atom in rules.atoms() {
        let outcome = match record.get(&atom.tag) {
            None => false,
            Some(value) => compare(value, atom.op, &atom.value),
        };
        env.insert(atom.name.clone(), outcome);
    }

    for combinator in rules.combinators() {
        let outcome = combinator.expr.evaluate(&env);
        env.insert(combinator.name.clone(), outcome);
    }

    rules.trigger().evaluate(&env)
}

/// Compares a record value against an atom literal, degrading every failure
/// to `false`
fn compare(value: &AttributeValue, op: CmpOp, literal: &str) -> bool {
    match value {
        AttributeValue::Number(n) => {
            let Ok(expected) = literal.trim().parse::<f64>() else {
                tracing::debug!(literal, "atom literal is not numeric, comparison is false");
                return false;
            };
            match op {
                CmpOp::Eq => *n == expected,
                CmpOp::Ne => *n != expected,
                CmpOp::Lt => *n < expected,
                CmpOp::Gt => *n > expected,
                CmpOp::Le => *n <= expected,
                CmpOp::Ge => *n >= expected,
            }
        }
        AttributeValue::Text(s) => match op {
            CmpOp::Eq => s == literal,
            CmpOp::Ne => s != literal,
            // Relational operators on text have no defined semantics in the
            // rule corpus; fail to false rather than invent lexicographic
            // ordering.
            CmpOp::Lt | CmpOp::Gt | CmpOp::Le | CmpOp::Ge => false,
        },
    }
}

/// Accepts a sorted position list as consecutive if every value sits within
/// 1% of the mean adjacent spacing from its expected arithmetic-progression
/// slot
fn is_consecutive(sorted: &[f64]) -> bool {
    if sorted.len() < 2 {
        return true;
    }
    let spacing = (sorted[sorted.len() - 1] - sorted[0]) / (sorted.len() - 1) as f64;
    let tolerance = SPACING_TOLERANCE * spacing.abs();
    sorted.iter().enumerate().all(|(i, &observed)| {
        let expected = sorted[0] + spacing * i as f64;
        (observed - expected).abs() <= tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IMAGE_POSITION_TAG, TagKey};

    const RULES: &str = r#"
T1_1 : (0008,0060) Modality == "MR"
T1_2 : (0018,0050) Slice Thickness > "2.5"
C1_1 : T1_1 && ~T1_2
Trigger : C1_1
ModelName: "Prostate_MRL"
ModelHash: "abc"
ReturnDirectory_1: /out
"#;

    fn rules() -> RuleSet {
        RuleSet::parse(RULES).unwrap()
    }

    fn record(modality: &str, thickness: f64, position: Option<f64>) -> AttributeRecord {
        let mut r = AttributeRecord::new();
        r.insert(TagKey::from_hex("0008", "0060").unwrap(), modality);
        r.insert(TagKey::from_hex("0018", "0050").unwrap(), thickness);
        if let Some(z) = position {
            r.insert(IMAGE_POSITION_TAG, z);
        }
        r
    }

    #[test]
    fn test_basic_trigger_per_image() {
        let records = vec![
            record("MR", 2.0, Some(10.0)),
            record("CT", 2.0, Some(20.0)),
            record("MR", 3.0, Some(30.0)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.per_image, vec![true, false, false]);
        assert_eq!(decision.triggered_count(), 1);
    }

    #[test]
    fn test_absent_tag_is_false_without_error() {
        let mut r = AttributeRecord::new();
        r.insert(TagKey::from_hex("0018", "0050").unwrap(), 2.0);
        // Modality tag absent: T1_1 false, so C1_1 false
        let decision = evaluate_series(&rules(), &[r]);
        assert_eq!(decision.per_image, vec![false]);
    }

    #[test]
    fn test_numeric_vs_text_comparison() {
        // Thickness as text: relational > degrades to false, so ~T1_2 holds
        let mut r = AttributeRecord::new();
        r.insert(TagKey::from_hex("0008", "0060").unwrap(), "MR");
        r.insert(TagKey::from_hex("0018", "0050").unwrap(), "3.0");
        let decision = evaluate_series(&rules(), &[r]);
        assert_eq!(decision.per_image, vec![true]);
    }

    #[test]
    fn test_ne_operator_semantics() {
        let text = r#"
T1_1 : (0008,0060) Modality ~= "CT"
Trigger : T1_1
ModelName: "m"
ModelHash: "h"
ReturnDirectory_1: /out
"#;
        let rules = RuleSet::parse(text).unwrap();
        let decision = evaluate_series(&rules, &[record("MR", 1.0, None)]);
        assert_eq!(decision.per_image, vec![true]);
        let decision = evaluate_series(&rules, &[record("CT", 1.0, None)]);
        assert_eq!(decision.per_image, vec![false]);
    }

    #[test]
    fn test_consecutive_stack() {
        let records = vec![
            record("MR", 2.0, Some(10.0)),
            record("MR", 2.0, Some(20.0)),
            record("MR", 2.0, Some(30.0)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.per_image, vec![true, true, true]);
        assert_eq!(decision.consecutive, Verdict::Yes);
        assert_eq!(decision.position_available, Verdict::Yes);
    }

    #[test]
    fn test_non_consecutive_stack() {
        let records = vec![
            record("MR", 2.0, Some(10.0)),
            record("MR", 2.0, Some(25.0)),
            record("MR", 2.0, Some(20.0)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.consecutive, Verdict::No);
        assert_eq!(decision.position_available, Verdict::Yes);
    }

    #[test]
    fn test_unsorted_but_even_stack_is_consecutive() {
        // Positions are sorted before the progression check
        let records = vec![
            record("MR", 2.0, Some(30.0)),
            record("MR", 2.0, Some(10.0)),
            record("MR", 2.0, Some(20.0)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.consecutive, Verdict::Yes);
    }

    #[test]
    fn test_missing_position_on_triggered_image() {
        let records = vec![
            record("MR", 2.0, Some(10.0)),
            record("MR", 2.0, None),
            record("MR", 2.0, Some(30.0)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.position_available, Verdict::No);
        assert_eq!(decision.consecutive, Verdict::No);
    }

    #[test]
    fn test_missing_position_on_untriggered_image_is_harmless() {
        let records = vec![
            record("MR", 2.0, Some(10.0)),
            record("CT", 2.0, None),
            record("MR", 2.0, Some(12.5)),
        ];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.per_image, vec![true, false, true]);
        assert_eq!(decision.position_available, Verdict::Yes);
        assert_eq!(decision.consecutive, Verdict::Yes);
    }

    #[test]
    fn test_zero_triggered_gives_unknown_verdicts() {
        let records = vec![record("CT", 2.0, Some(10.0))];
        let decision = evaluate_series(&rules(), &records);
        assert!(!decision.any_triggered());
        assert_eq!(decision.consecutive, Verdict::Unknown);
        assert_eq!(decision.position_available, Verdict::Unknown);
    }

    #[test]
    fn test_single_triggered_image_is_consecutive() {
        let records = vec![record("MR", 2.0, Some(42.0))];
        let decision = evaluate_series(&rules(), &records);
        assert_eq!(decision.consecutive, Verdict::Yes);
        assert_eq!(decision.position_available, Verdict::Yes);
    }

    #[test]
    fn test_spacing_just_inside_and_outside_tolerance() {
        // Spacing mean is 10; the middle slot may deviate by at most 0.1
        let inside = vec![
            record("MR", 2.0, Some(0.0)),
            record("MR", 2.0, Some(10.09)),
            record("MR", 2.0, Some(20.0)),
        ];
        assert_eq!(evaluate_series(&rules(), &inside).consecutive, Verdict::Yes);

        let outside = vec![
            record("MR", 2.0, Some(0.0)),
            record("MR", 2.0, Some(10.5)),
            record("MR", 2.0, Some(20.0)),
        ];
        assert_eq!(evaluate_series(&rules(), &outside).consecutive, Verdict::No);
    }

    #[test]
    fn test_empty_series() {
        let decision = evaluate_series(&rules(), &[]);
        assert!(decision.per_image.is_empty());
        assert_eq!(decision.consecutive, Verdict::Unknown);
        assert_eq!(decision.position_available, Verdict::Unknown);
    }
}
