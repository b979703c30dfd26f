#![forbid(unsafe_code)]

//! Parser for the semi-structured query-tool response format
//!
//! The external data-location query tool prints a JSON-like but non-standard
//! format: single- or double-quoted strings, `Long("123")` numeric wrappers,
//! `ISODate(...)` and `Binary.createFromBase64(...)` literals, and nested
//! lists/objects. The top level is always bracket-delimited by `[...]`.
//!
//! Compound values are taken apart with the outermost-comma splitter: a comma
//! is a split point only when every bracket family (`{}`, `[]`, `()`) is at
//! depth zero and no quote span is open. Object segments are then split at
//! their *first* colon into key and value. That first-colon rule is inherited
//! from the producing tool and is ambiguous when a string value contains a
//! colon before the true separator; it is documented here, not fixed.

use crate::error::ResponseError;
use crate::response::value::GenericValue;
use std::collections::BTreeMap;

/// Prefix applied to keys beginning with an underscore, so they stay
/// identifier-styled (`_id` becomes `key_id`)
const UNDERSCORE_KEY_PREFIX: &str = "key";

/// Prefix applied to quoted purely-hex/numeric keys, so they cannot collide
/// with ordinary names (`"0a1b"` becomes `hex_0a1b`)
const HEX_KEY_PREFIX: &str = "hex_";

/// Parses a complete response blob
///
/// The top level must be bracket-delimited by `[...]`.
pub fn parse_response(text: &str) -> Result<GenericValue, ResponseError> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Err(ResponseError::MissingOuterBrackets(snippet(trimmed)));
    }
    parse_value(trimmed)
}

/// Recursively parses one value: compound forms first, then scalars
fn parse_value(text: &str) -> Result<GenericValue, ResponseError> {
    let s = text.trim();

    if s.starts_with('[') && s.ends_with(']') && s.len() >= 2 {
        return parse_list(&s[1..s.len() - 1]);
    }
    if s.starts_with('{') && s.ends_with('}') && s.len() >= 2 {
        return parse_object(&s[1..s.len() - 1]);
    }
    parse_scalar(s)
}

fn parse_list(inner: &str) -> Result<GenericValue, ResponseError> {
    if inner.trim().is_empty() {
        return Ok(GenericValue::List(Vec::new()));
    }
    let items = split_outermost_commas(inner)
        .into_iter()
        .map(parse_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GenericValue::List(items))
}

fn parse_object(inner: &str) -> Result<GenericValue, ResponseError> {
    // `{}` is the explicit empty-value sentinel, matching the lenient
    // handling of incomplete nested objects.
    if inner.trim().is_empty() {
        return Ok(GenericValue::Empty);
    }
    let mut map = BTreeMap::new();
    for segment in split_outermost_commas(inner) {
        let (raw_key, raw_value) = segment
            .split_once(':')
            .ok_or_else(|| ResponseError::MissingSeparator(snippet(segment)))?;
        map.insert(normalize_key(raw_key), parse_value(raw_value)?);
    }
    Ok(GenericValue::Map(map))
}

fn parse_scalar(s: &str) -> Result<GenericValue, ResponseError> {
    if s.len() >= 2 {
        let first = s.as_bytes()[0];
        let last = s.as_bytes()[s.len() - 1];
        // Quote style need not match across the document, but must be
        // symmetric per token
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return Ok(GenericValue::Text(s[1..s.len() - 1].to_string()));
        }
    }

    match s {
        "true" => return Ok(GenericValue::Bool(true)),
        "false" => return Ok(GenericValue::Bool(false)),
        "null" => return Ok(GenericValue::Null),
        _ => {}
    }

    if let Some(inner) = s.strip_prefix("Long(").and_then(|r| r.strip_suffix(')')) {
        let digits = unquote(inner.trim());
        return digits
            .parse::<f64>()
            .map(GenericValue::Number)
            .map_err(|_| ResponseError::InvalidLong(snippet(s)));
    }

    // Opaque literals are preserved verbatim for downstream consumers
    if (s.starts_with("Binary.createFromBase64(") || s.starts_with("ISODate("))
        && s.ends_with(')')
    {
        return Ok(GenericValue::Text(s.to_string()));
    }

    if let Ok(n) = s.parse::<f64>() {
        return Ok(GenericValue::Number(n));
    }

    Err(ResponseError::UnrecognizedScalar(snippet(s)))
}

/// Splits on commas that sit outside every bracket family and quote span
///
/// Depth counters for `{}`, `[]`, and `()` are tracked independently; while a
/// quote span is open, every delimiter character is ignored. A quote
/// character only closes the span it opened.
fn split_outermost_commas(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut curly = 0i32;
    let mut square = 0i32;
    let mut paren = 0i32;
    let mut in_single = false;
    let mut in_double = false;
    let mut start = 0usize;

    for (i, c) in s.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ if in_single || in_double => {}
            '{' => curly += 1,
            '}' => curly -= 1,
            '[' => square += 1,
            ']' => square -= 1,
            '(' => paren += 1,
            ')' => paren -= 1,
            ',' if curly == 0 && square == 0 && paren == 0 => {
                segments.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&s[start..]);
    segments
}

/// Rewrites keys that would not survive as identifier-style names
fn normalize_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let was_quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    let key = if was_quoted {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    if key.starts_with('_') {
        return format!("{UNDERSCORE_KEY_PREFIX}{key}");
    }
    if was_quoted && !key.is_empty() && key.chars().all(|c| c.is_ascii_hexdigit()) {
        return format!("{HEX_KEY_PREFIX}{key}");
    }
    key.to_string()
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2 {
        let first = s.as_bytes()[0];
        let last = s.as_bytes()[s.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Shortens a fragment for error messages
fn snippet(s: &str) -> String {
    const MAX: usize = 120;
    if s.len() <= MAX {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}
