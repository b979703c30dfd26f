#![forbid(unsafe_code)]

//! The generic value tree produced by the response parser

use std::collections::BTreeMap;
use std::fmt;

/// A decoded value from a semi-structured query response
///
/// `Empty` is the explicit sentinel produced by `{}` and is distinct from an
/// empty `Map`; downstream location resolution treats it as "object present
/// but carries nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum GenericValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// The `null` literal
    Null,
    /// The empty-object sentinel from `{}`
    Empty,
    List(Vec<GenericValue>),
    Map(BTreeMap<String, GenericValue>),
}

impl GenericValue {
    /// Returns the contained text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GenericValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained number, if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            GenericValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained list, if this is a list
    pub fn as_list(&self) -> Option<&[GenericValue]> {
        match self {
            GenericValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the contained mapping, if this is a mapping
    pub fn as_map(&self) -> Option<&BTreeMap<String, GenericValue>> {
        match self {
            GenericValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Walks a path of map keys, returning the value at the end
    pub fn lookup(&self, path: &[&str]) -> Option<&GenericValue> {
        let mut current = self;
        for key in path {
            current = current.as_map()?.get(*key)?;
        }
        Some(current)
    }

    /// Converts to a serde_json value for machine-readable output
    ///
    /// `Null` and `Empty` both render as JSON null; the distinction only
    /// matters inside the resolution logic.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GenericValue::Text(s) => serde_json::Value::String(s.clone()),
            GenericValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            GenericValue::Bool(b) => serde_json::Value::Bool(*b),
            GenericValue::Null | GenericValue::Empty => serde_json::Value::Null,
            GenericValue::List(items) => {
                serde_json::Value::Array(items.iter().map(GenericValue::to_json).collect())
            }
            GenericValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for GenericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericValue::Text(s) => write!(f, "{s:?}"),
            GenericValue::Number(n) => write!(f, "{n}"),
            GenericValue::Bool(b) => write!(f, "{b}"),
            GenericValue::Null => write!(f, "null"),
            GenericValue::Empty => write!(f, "{{}}"),
            GenericValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            GenericValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
