#![forbid(unsafe_code)]

//! Core domain types for seriesgate
//!
//! This module defines the fundamental types used throughout the trigger
//! engine: DICOM tag keys, rule names, comparison operators, and the
//! per-image attribute records the evaluator consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The tag holding Image Position (Patient), whose third component is the
/// spatial coordinate used by the consecutiveness check.
pub const IMAGE_POSITION_TAG: TagKey = TagKey {
    group: 0x0020,
    element: 0x0032,
};

/// A DICOM attribute tag: group and element, each parsed from 4 hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagKey {
    pub group: u16,
    pub element: u16,
}

impl TagKey {
    /// Creates a TagKey from two 4-hex-digit strings
    ///
    /// Returns None if either half is not exactly four hex digits.
    pub fn from_hex(group: &str, element: &str) -> Option<Self> {
        if group.len() != 4 || element.len() != 4 {
            return None;
        }
        let group = u16::from_str_radix(group, 16).ok()?;
        let element = u16::from_str_radix(element, 16).ok()?;
        Some(TagKey { group, element })
    }

    /// Parses a `GGGG,EEEE` pair, with or without surrounding parentheses
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('(').unwrap_or(s);
        let s = s.strip_suffix(')').unwrap_or(s);
        let (group, element) = s.split_once(',')?;
        Self::from_hex(group.trim(), element.trim())
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04x},{:04x})", self.group, self.element)
    }
}

impl TryFrom<String> for TagKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TagKey::parse(&value).ok_or_else(|| format!("Invalid tag key: {value}"))
    }
}

impl From<TagKey> for String {
    fn from(tag: TagKey) -> Self {
        format!("{:04x},{:04x}", tag.group, tag.element)
    }
}

/// A validated atom or combinator name (`T<n>_<m>` or `C<n>_<m>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleName(String);

impl RuleName {
    /// Creates a new RuleName, validating the `[TC]<digits>_<digits>` shape
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if Self::is_valid(&name) {
            Some(RuleName(name))
        } else {
            None
        }
    }

    /// Returns true if `s` has the exact `[TC]<digits>_<digits>` shape
    pub fn is_valid(s: &str) -> bool {
        let mut chars = s.chars();
        if !matches!(chars.next(), Some('T') | Some('C')) {
            return false;
        }
        let rest: &str = chars.as_str();
        let Some((n, m)) = rest.split_once('_') else {
            return false;
        };
        !n.is_empty()
            && !m.is_empty()
            && n.chars().all(|c| c.is_ascii_digit())
            && m.chars().all(|c| c.is_ascii_digit())
    }

    /// True for atom names (`T` prefix)
    pub fn is_atom(&self) -> bool {
        self.0.starts_with('T')
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RuleName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RuleName::new(value).ok_or_else(|| "Invalid rule name".to_string())
    }
}

impl From<RuleName> for String {
    fn from(name: RuleName) -> Self {
        name.0
    }
}

/// Comparison operators permitted in atom definitions
///
/// `~=` is the negated exact comparison; the remaining relational operators
/// carry numeric semantics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "~=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl CmpOp {
    /// All operators, two-character forms first so that matching is
    /// longest-match
    pub const ALL: [CmpOp; 6] = [
        CmpOp::Eq,
        CmpOp::Ne,
        CmpOp::Le,
        CmpOp::Ge,
        CmpOp::Lt,
        CmpOp::Gt,
    ];

    /// Returns the operator's source text
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "~=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }

    /// Parses an operator token, longest match first
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == s)
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scalar attribute value as retrieved from the imaging platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        AttributeValue::Number(n)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

/// The per-image tag→value mapping evaluated against a RuleSet
///
/// Records are supplied externally, one per image in a series, and are
/// consumed within a single decision cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord {
    tags: BTreeMap<TagKey, AttributeValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tag value, replacing any previous value for that tag
    pub fn insert(&mut self, tag: TagKey, value: impl Into<AttributeValue>) {
        self.tags.insert(tag, value.into());
    }

    /// Looks up a tag value
    pub fn get(&self, tag: &TagKey) -> Option<&AttributeValue> {
        self.tags.get(tag)
    }

    /// Extracts the third spatial coordinate from Image Position (Patient)
    ///
    /// A numeric value is taken directly; a text value is treated as a
    /// DICOM multi-value string and its last `\`-separated component is
    /// parsed as a number.
    pub fn third_position(&self) -> Option<f64> {
        match self.get(&IMAGE_POSITION_TAG)? {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.rsplit('\\').next()?.trim().parse().ok(),
        }
    }
}

impl FromIterator<(TagKey, AttributeValue)> for AttributeRecord {
    fn from_iter<I: IntoIterator<Item = (TagKey, AttributeValue)>>(iter: I) -> Self {
        AttributeRecord {
            tags: iter.into_iter().collect(),
        }
    }
}
