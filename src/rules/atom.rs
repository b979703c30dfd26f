#![forbid(unsafe_code)]

//! Atom line parsing
//!
//! An atom is a single named boolean test against one DICOM attribute:
//!
//! ```text
//! T2_4 : (0018,0050) Slice Thickness > "2.5"
//! ```
//!
//! The free text between the tag and the operator is descriptive only and is
//! discarded. The quoted literal is kept verbatim (tab-normalized, trimmed);
//! whether it is compared numerically or textually is decided per record at
//! evaluation time.

use crate::error::FormatError;
use crate::types::{CmpOp, RuleName, TagKey};
use regex::Regex;
use std::sync::OnceLock;

/// A single named boolean test against one DICOM attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: RuleName,
    pub tag: TagKey,
    pub op: CmpOp,
    pub value: String,
}

/// Atom line grammar. Two-character operators are listed first so the
/// alternation is longest-match.
fn atom_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(T\d+_\d+)\s*:\s*\(([0-9a-fA-F]{4}),([0-9a-fA-F]{4})\)\s*(?:.*?)\s*(==|~=|<=|>=|<|>)\s*"([^"]*)"\s*$"#,
        )
        .expect("atom line regex is valid")
    })
}

impl Atom {
    /// Parses one preprocessed atom line
    pub fn parse_line(line: &str) -> Result<Atom, FormatError> {
        let captures = atom_line_regex()
            .captures(line)
            .ok_or_else(|| FormatError::MalformedAtom(line.to_string()))?;

        let name = RuleName::new(&captures[1])
            .ok_or_else(|| FormatError::MalformedAtom(line.to_string()))?;
        let tag = TagKey::from_hex(&captures[2], &captures[3])
            .ok_or_else(|| FormatError::MalformedAtom(line.to_string()))?;
        let op = CmpOp::parse(&captures[4])
            .ok_or_else(|| FormatError::MalformedAtom(line.to_string()))?;
        let value = captures[5].replace('\t', " ").trim().to_string();

        Ok(Atom {
            name,
            tag,
            op,
            value,
        })
    }
}
