//! Bounded field extraction over semi-structured text.
//!
//! Both container formats embed JSON-shaped text, but the wire contract only
//! guarantees flat records with unique key names. The text is scanned, not
//! parsed into a tree, so the one safety net against reading a field from a
//! neighbouring record is the span check: a value located past the end of
//! the enclosing object is treated as absent.

use crate::error::VaultError;

/// Byte range of one object inside a larger text buffer.
///
/// `start` is the offset of the opening brace, `end` the offset of the
/// matching (first following) closing brace.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span covering the entire buffer.
    pub fn whole(text: &str) -> Self {
        Span {
            start: 0,
            end: text.len(),
        }
    }
}

/// Locates the first object of the named array: `"key": [ { ... } ]`.
///
/// The records this is used on contain no nested braces, so the first `}`
/// after the opening brace closes the object.
pub fn first_object_of_array(text: &str, array_key: &str) -> Result<Span, VaultError> {
    let missing = || VaultError::FieldNotFound(array_key.to_string());

    let needle = format!("\"{array_key}\"");
    let after_key = text.find(&needle).ok_or_else(missing)? + needle.len();

    let start = text[after_key..].find('{').ok_or_else(missing)? + after_key;
    let end = text[start + 1..].find('}').ok_or_else(missing)? + start + 1;

    Ok(Span { start, end })
}

/// Extracts the quoted string value of `key` inside `span`.
pub fn string_field(text: &str, span: Span, key: &str) -> Result<String, VaultError> {
    let missing = || VaultError::FieldNotFound(key.to_string());

    let needle = format!("\"{key}\"");
    let after_key = text[span.start..].find(&needle).ok_or_else(missing)? + span.start + needle.len();

    let open = text[after_key..].find('"').ok_or_else(missing)? + after_key;
    if open > span.end {
        // the next occurrence belongs to a different record
        return Err(missing());
    }
    let close = text[open + 1..].find('"').ok_or_else(missing)? + open + 1;

    Ok(text[open + 1..close].to_string())
}

/// Extracts the bare numeric value of `key` inside `span`.
///
/// The numeral runs from the `:` separator to the next `,` or `}`.
pub fn int_field(text: &str, span: Span, key: &str) -> Result<u32, VaultError> {
    let missing = || VaultError::FieldNotFound(key.to_string());

    let needle = format!("\"{key}\"");
    let after_key = text[span.start..].find(&needle).ok_or_else(missing)? + span.start + needle.len();

    let colon = text[after_key..].find(':').ok_or_else(missing)? + after_key;
    if colon > span.end {
        return Err(missing());
    }

    let rest = &text[colon + 1..];
    let value = rest[..rest.find([',', '}']).ok_or_else(missing)?].trim();

    value.parse::<u32>().map_err(|_| VaultError::MalformedInteger {
        field: key.to_string(),
        value: value.to_string(),
    })
}
