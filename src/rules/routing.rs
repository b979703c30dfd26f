#![forbid(unsafe_code)]

//! Per-model routing configuration
//!
//! Everything after the trigger line in a rule file is a `Key: value` routing
//! entry. Entry order is preserved as written. Recognized keys get their
//! literal format checked as the entry is added; unknown keys are accepted
//! verbatim so newer rule files keep loading on older engines.

use crate::error::{CompletenessError, FormatError};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One `Key: value` line, order-preserving
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingEntry {
    pub key: String,
    pub value: String,
}

/// Ordered routing configuration for one model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingConfig {
    entries: Vec<RoutingEntry>,
}

fn quoted_fields_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("quoted fields regex is valid"))
}

/// Strips one pair of symmetric double quotes, if present
fn unquote(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn require_nonempty(key: &str, value: &str) -> Result<(), FormatError> {
    if unquote(value).trim().is_empty() {
        return Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: "value must be non-empty".to_string(),
        });
    }
    Ok(())
}

fn require_positive_int(key: &str, value: &str) -> Result<(), FormatError> {
    let text = unquote(value).trim();
    match text.parse::<u64>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got {text:?}"),
        }),
    }
}

fn require_bool(key: &str, value: &str) -> Result<(), FormatError> {
    let text = unquote(value).trim();
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        Ok(())
    } else {
        Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("expected \"true\" or \"false\", got {text:?}"),
        })
    }
}

/// Validates a `Struct_n` value: five quoted fields, the fourth an RGB triple
/// with each component in [0,255], the fifth an index
fn require_struct_fields(key: &str, value: &str) -> Result<(), FormatError> {
    let fields: Vec<&str> = quoted_fields_regex()
        .captures_iter(value)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if fields.len() != 5 {
        return Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("expected five quoted fields, found {}", fields.len()),
        });
    }

    let rgb = fields[3].trim();
    let rgb = rgb
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("fourth field must be an [r,g,b] triple, got {:?}", fields[3]),
        })?;
    let components: Vec<&str> = rgb.split(',').map(str::trim).collect();
    if components.len() != 3 || components.iter().any(|c| c.parse::<u8>().is_err()) {
        return Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("RGB components must each be in [0,255], got [{rgb}]"),
        });
    }

    if fields[4].trim().parse::<u32>().is_err() {
        return Err(FormatError::InvalidValue {
            key: key.to_string(),
            message: format!("trailing index must be an integer, got {:?}", fields[4]),
        });
    }
    Ok(())
}

impl RoutingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one routing entry, checking the literal format of recognized keys
    pub fn push(&mut self, key: &str, value: &str) -> Result<(), FormatError> {
        let key = key.trim();
        let value = value.trim();
        match key {
            "ModelName" | "ModelHash" | "SendDirectory" => require_nonempty(key, value)?,
            "NiceLevel" | "InferenceMaxRunTime" => require_positive_int(key, value)?,
            "EmptyStructWithModelName" => require_bool(key, value)?,
            _ if key.starts_with("ReturnDicomNodeSendScan_")
                || key.starts_with("ReturnDirectorySendScan_") =>
            {
                require_bool(key, value)?
            }
            _ if key.starts_with("ReturnDicomNodeIP_")
                || key.starts_with("ReturnDicomNodePort_")
                || key.starts_with("ReturnDicomNodeAET_")
                || key.starts_with("ReturnDirectory_") =>
            {
                require_nonempty(key, value)?
            }
            _ if key.starts_with("Struct_") => require_struct_fields(key, value)?,
            // Forward-compatible: unknown keys are kept verbatim
            _ => {}
        }
        self.entries.push(RoutingEntry {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    /// Looks up the first value stored under `key`, with quotes stripped
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| unquote(&entry.value))
    }

    /// Iterates entries in file order
    pub fn iter(&self) -> impl Iterator<Item = &RoutingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups `ReturnDicomNode{IP,Port,AET}_n` keys by their index suffix
    fn dicom_node_indices(&self) -> BTreeMap<String, Vec<&'static str>> {
        let mut nodes: BTreeMap<String, Vec<&'static str>> = BTreeMap::new();
        for entry in &self.entries {
            for part in ["IP", "Port", "AET"] {
                let prefix = match part {
                    "IP" => "ReturnDicomNodeIP_",
                    "Port" => "ReturnDicomNodePort_",
                    _ => "ReturnDicomNodeAET_",
                };
                if let Some(index) = entry.key.strip_prefix(prefix) {
                    let parts = nodes.entry(index.to_string()).or_default();
                    if !parts.contains(&part) {
                        parts.push(part);
                    }
                }
            }
        }
        nodes
    }

    /// Whole-config completeness validation, run after the full rule file is
    /// read
    pub fn validate_completeness(&self) -> Result<(), CompletenessError> {
        for required in ["ModelName", "ModelHash"] {
            match self.get(required) {
                Some(value) if !value.trim().is_empty() => {}
                _ => return Err(CompletenessError::MissingKey(required.to_string())),
            }
        }

        let nodes = self.dicom_node_indices();
        for (index, parts) in &nodes {
            let missing: Vec<&str> = ["IP", "Port", "AET"]
                .into_iter()
                .filter(|part| !parts.contains(part))
                .collect();
            if !missing.is_empty() {
                return Err(CompletenessError::IncompleteDicomNode {
                    index: index.clone(),
                    missing: missing.join(", "),
                });
            }
        }

        let has_directory = self
            .entries
            .iter()
            .any(|entry| entry.key.starts_with("ReturnDirectory_"));
        let has_complete_node = !nodes.is_empty();
        if !has_directory && !has_complete_node {
            return Err(CompletenessError::NoReturnTarget);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> RoutingConfig {
        let mut routing = RoutingConfig::new();
        for (key, value) in pairs {
            routing.push(key, value).unwrap();
        }
        routing
    }

    #[test]
    fn test_entry_order_is_preserved() {
        let routing = config(&[
            ("ModelName", r#""Prostate_MRL""#),
            ("ModelHash", r#""abc123""#),
            ("ReturnDirectory_1", "/data/returns"),
        ]);
        let keys: Vec<&str> = routing.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["ModelName", "ModelHash", "ReturnDirectory_1"]);
    }

    #[test]
    fn test_get_strips_quotes() {
        let routing = config(&[("ModelName", r#""Prostate_MRL""#)]);
        assert_eq!(routing.get("ModelName"), Some("Prostate_MRL"));
    }

    #[test]
    fn test_nice_level_must_be_positive_int() {
        let mut routing = RoutingConfig::new();
        assert!(routing.push("NiceLevel", r#""10""#).is_ok());
        assert!(routing.push("NiceLevel", r#""0""#).is_err());
        assert!(routing.push("NiceLevel", r#""-3""#).is_err());
        assert!(routing.push("NiceLevel", r#""ten""#).is_err());
    }

    #[test]
    fn test_empty_struct_flag_literals() {
        let mut routing = RoutingConfig::new();
        assert!(routing.push("EmptyStructWithModelName", r#""true""#).is_ok());
        assert!(routing.push("EmptyStructWithModelName", r#""False""#).is_ok());
        assert!(routing.push("EmptyStructWithModelName", r#""yes""#).is_err());
    }

    #[test]
    fn test_send_scan_flags() {
        let mut routing = RoutingConfig::new();
        assert!(routing.push("ReturnDirectorySendScan_1", r#""true""#).is_ok());
        assert!(routing.push("ReturnDicomNodeSendScan_1", r#""false""#).is_ok());
        assert!(routing.push("ReturnDicomNodeSendScan_2", r#""maybe""#).is_err());
    }

    #[test]
    fn test_struct_value_format() {
        let mut routing = RoutingConfig::new();
        assert!(
            routing
                .push("Struct_1", r#""Bladder" "Bladder_AI" "ORGAN" "[255,200,0]" "1""#)
                .is_ok()
        );
        // Too few fields
        assert!(
            routing
                .push("Struct_2", r#""Bladder" "ORGAN" "[255,200,0]" "1""#)
                .is_err()
        );
        // RGB component out of range
        assert!(
            routing
                .push("Struct_3", r#""a" "b" "ORGAN" "[300,0,0]" "1""#)
                .is_err()
        );
        // Non-numeric trailing index
        assert!(
            routing
                .push("Struct_4", r#""a" "b" "ORGAN" "[1,2,3]" "first""#)
                .is_err()
        );
    }

    #[test]
    fn test_unknown_keys_accepted_verbatim() {
        let mut routing = RoutingConfig::new();
        routing.push("FutureOption", "whatever").unwrap();
        assert_eq!(routing.get("FutureOption"), Some("whatever"));
    }

    #[test]
    fn test_completeness_requires_model_identity() {
        let routing = config(&[("ReturnDirectory_1", "/data/returns")]);
        let err = routing.validate_completeness().unwrap_err();
        assert!(matches!(err, CompletenessError::MissingKey(ref key) if key == "ModelName"));
    }

    #[test]
    fn test_completeness_requires_full_node_triple() {
        let routing = config(&[
            ("ModelName", r#""m""#),
            ("ModelHash", r#""h""#),
            ("ReturnDicomNodeIP_1", r#""10.0.0.1""#),
            ("ReturnDicomNodePort_1", r#""104""#),
        ]);
        let err = routing.validate_completeness().unwrap_err();
        match err {
            CompletenessError::IncompleteDicomNode { index, missing } => {
                assert_eq!(index, "1");
                assert_eq!(missing, "AET");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_completeness_requires_a_return_target() {
        let routing = config(&[("ModelName", r#""m""#), ("ModelHash", r#""h""#)]);
        let err = routing.validate_completeness().unwrap_err();
        assert!(matches!(err, CompletenessError::NoReturnTarget));

        // A send-scan flag alone is not a return target
        let routing = config(&[
            ("ModelName", r#""m""#),
            ("ModelHash", r#""h""#),
            ("ReturnDirectorySendScan_1", r#""true""#),
        ]);
        assert!(matches!(
            routing.validate_completeness(),
            Err(CompletenessError::NoReturnTarget)
        ));
    }

    #[test]
    fn test_completeness_accepts_directory_or_node() {
        let with_dir = config(&[
            ("ModelName", r#""m""#),
            ("ModelHash", r#""h""#),
            ("ReturnDirectory_1", "/data/out"),
        ]);
        assert!(with_dir.validate_completeness().is_ok());

        let with_node = config(&[
            ("ModelName", r#""m""#),
            ("ModelHash", r#""h""#),
            ("ReturnDicomNodeIP_1", r#""10.0.0.1""#),
            ("ReturnDicomNodePort_1", r#""104""#),
            ("ReturnDicomNodeAET_1", r#""AI_RETURN""#),
        ]);
        assert!(with_node.validate_completeness().is_ok());
    }
}
