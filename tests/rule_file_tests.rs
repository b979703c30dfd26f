//! Integration tests for rule-file parsing and validation
//!
//! Uses a realistic production-shaped rule file as the happy-path fixture and
//! a catalogue of broken variants for the error paths.

use seriesgate::error::{CompletenessError, FormatError, GateError};
use seriesgate::rules::RuleSet;
use seriesgate::types::{CmpOp, TagKey};

const PROSTATE_MRL: &str = include_str!("fixtures/prostate_mrl.rules");

#[test]
fn test_full_rule_file_parses() {
    let rules = RuleSet::parse(PROSTATE_MRL).unwrap();

    assert_eq!(rules.atoms().len(), 5);
    assert_eq!(rules.combinators().len(), 3);
    assert_eq!(rules.model_name(), "Prostate_MRL");

    let thickness = &rules.atoms()[2];
    assert_eq!(thickness.name.as_str(), "T2_1");
    assert_eq!(thickness.tag, TagKey::from_hex("0018", "0050").unwrap());
    assert_eq!(thickness.op, CmpOp::Le);
    assert_eq!(thickness.value, "3.0");
}

#[test]
fn test_routing_config_round_trip() {
    let rules = RuleSet::parse(PROSTATE_MRL).unwrap();
    let routing = rules.routing();

    assert_eq!(routing.get("ModelHash"), Some("9f8a7b6c5d4e"));
    assert_eq!(routing.get("NiceLevel"), Some("10"));
    assert_eq!(routing.get("ReturnDicomNodeIP_1"), Some("10.40.12.7"));
    assert_eq!(
        routing.get("ReturnDirectory_1"),
        Some("/data/ai/returns/prostate_mrl")
    );
    assert_eq!(routing.get("ReturnDirectorySendScan_1"), Some("true"));
    assert_eq!(
        routing.get("SendDirectory"),
        Some("/data/ai/inbox/prostate_mrl")
    );

    // Both structure definitions survive with order intact
    let structs: Vec<&str> = routing
        .iter()
        .filter(|e| e.key.starts_with("Struct_"))
        .map(|e| e.key.as_str())
        .collect();
    assert_eq!(structs, vec!["Struct_1", "Struct_2"]);
}

#[test]
fn test_comments_and_blank_lines_ignored() {
    let commented: String = PROSTATE_MRL
        .lines()
        .map(|line| format!("{line}   # appended comment\n"))
        .collect();
    let rules = RuleSet::parse(&commented).unwrap();
    assert_eq!(rules.atoms().len(), 5);
    assert_eq!(rules.model_name(), "Prostate_MRL");
}

#[test]
fn test_malformed_atom_reports_line() {
    let text = r#"
T1_1 : (0008,0060) Modality == MR
Trigger : T1_1
"#;
    let err = RuleSet::parse(text).unwrap_err();
    match err {
        GateError::Format(FormatError::MalformedAtom(line)) => {
            assert!(line.contains("Modality == MR"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trigger_referencing_undefined_combinator() {
    let text = r#"
T1_1 : (0008,0060) Modality == "MR"
Trigger : T1_1 && C5_5
ModelName: "m"
ModelHash: "h"
ReturnDirectory_1: /out
"#;
    let err = RuleSet::parse(text).unwrap_err();
    match err {
        GateError::Completeness(CompletenessError::UndefinedReference { name, reference }) => {
            assert_eq!(name, "Trigger");
            assert_eq!(reference, "C5_5");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_incomplete_dicom_node_detected() {
    let text = r#"
T1_1 : (0008,0060) Modality == "MR"
Trigger : T1_1
ModelName: "m"
ModelHash: "h"
ReturnDicomNodeIP_2: "10.0.0.9"
ReturnDirectory_1: /out
"#;
    let err = RuleSet::parse(text).unwrap_err();
    match err {
        GateError::Completeness(CompletenessError::IncompleteDicomNode { index, missing }) => {
            assert_eq!(index, "2");
            assert_eq!(missing, "Port, AET");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_send_scan_flag_must_be_boolean() {
    let text = r#"
T1_1 : (0008,0060) Modality == "MR"
Trigger : T1_1
ModelName: "m"
ModelHash: "h"
ReturnDirectory_1: /out
ReturnDirectorySendScan_1: "sometimes"
"#;
    let err = RuleSet::parse(text).unwrap_err();
    assert!(matches!(
        err,
        GateError::Format(FormatError::InvalidValue { .. })
    ));
}

#[test]
fn test_struct_with_bad_rgb_rejected() {
    let text = r#"
T1_1 : (0008,0060) Modality == "MR"
Trigger : T1_1
ModelName: "m"
ModelHash: "h"
ReturnDirectory_1: /out
Struct_1: "Prostate" "Prostate_AI" "ORGAN" "[255,300,0]" "1"
"#;
    let err = RuleSet::parse(text).unwrap_err();
    match err {
        GateError::Format(FormatError::InvalidValue { key, .. }) => assert_eq!(key, "Struct_1"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_node_only_return_target_is_sufficient() {
    let text = r#"
T1_1 : (0008,0060) Modality == "MR"
Trigger : T1_1
ModelName: "m"
ModelHash: "h"
ReturnDicomNodeIP_1: "10.0.0.1"
ReturnDicomNodePort_1: "104"
ReturnDicomNodeAET_1: "AI_RETURN"
"#;
    assert!(RuleSet::parse(text).is_ok());
}
