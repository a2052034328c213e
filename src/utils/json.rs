//! Raw JSON text helpers for documents that fail to parse.
//!
//! When a manifest or JSON-LD body is malformed, its double-quoted string
//! literals are still the only places an asset URL can live. These helpers
//! find and rewrite them without a full parse.

use std::ops::Range;

use super::html::{Edit, apply_edits};

/// Byte ranges of the contents of every double-quoted string literal.
///
/// Backslash escapes are skipped over; an unterminated literal runs to the end.
pub fn string_literals(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut j = start;
        while j < bytes.len() && bytes[j] != b'"' {
            j += if bytes[j] == b'\\' { 2 } else { 1 };
        }
        let end = j.min(bytes.len());
        ranges.push(start..end);
        i = end + 1;
    }

    ranges
}

/// Decoded value of a literal: only `\/` is unescaped, which is all a URL needs.
#[inline]
pub fn literal_value(raw: &str) -> String {
    raw.replace("\\/", "/")
}

/// Rewrite every string literal through `update`.
///
/// Returns `None` when no literal changed.
pub fn rewrite_literals(text: &str, mut update: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let edits: Vec<Edit> = string_literals(text)
        .into_iter()
        .filter_map(|span| {
            let value = literal_value(&text[span.clone()]);
            let replaced = update(&value)?;
            Some(Edit {
                span,
                text: escape_literal(&replaced),
            })
        })
        .collect();

    if edits.is_empty() {
        None
    } else {
        Some(apply_edits(text, edits))
    }
}

/// Escape a plain string for placement between double quotes.
fn escape_literal(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
