//! Web app manifest rewriting.
//!
//! ```json
//! { "icons": [{ "src": "/icons/icon.png", "type": "image/image/png" }] }
//! ```
//! becomes
//! ```json
//! { "icons": [{ "src": "/assets/icons/icon-ab12cd34.png", "type": "image/png" }] }
//! ```
//!
//! Icon sources go through the resolver; icon MIME types with a duplicated
//! prefix are repaired whether or not the source changed; every other string
//! (and string in an array) anywhere in the manifest is rewritten when it
//! resolves in the mapping.

use serde_json::{Map, Value};

use crate::utils::json::rewrite_literals;

use super::UrlResolver;

/// Rewritten manifest text, or `None` when nothing changed.
///
/// Malformed JSON falls back to rewriting its raw string literals.
pub fn rewrite_manifest(text: &str, resolver: &UrlResolver<'_>) -> Option<String> {
    let Ok(mut value) = serde_json::from_str::<Value>(text) else {
        return rewrite_literals(text, |s| resolver.update_url(s));
    };

    let changes = rewrite_manifest_value(&mut value, resolver);
    if changes == 0 {
        return None;
    }
    serde_json::to_string_pretty(&value).ok().map(|mut out| {
        if text.ends_with('\n') {
            out.push('\n');
        }
        out
    })
}

/// Apply manifest rules in place, returning the number of changed values.
pub fn rewrite_manifest_value(value: &mut Value, resolver: &UrlResolver<'_>) -> usize {
    let Value::Object(root) = value else {
        return rewrite_strings(value, resolver);
    };

    let mut changes = 0;
    if let Some(Value::Array(icons)) = root.get_mut("icons") {
        for icon in icons.iter_mut().filter_map(Value::as_object_mut) {
            changes += rewrite_icon(icon, resolver);
        }
    }

    for (key, field) in root.iter_mut() {
        if key != "icons" {
            changes += rewrite_strings(field, resolver);
        }
    }
    changes
}

fn rewrite_icon(icon: &mut Map<String, Value>, resolver: &UrlResolver<'_>) -> usize {
    let mut changes = 0;

    if let Some(Value::String(src)) = icon.get_mut("src")
        && let Some(updated) = resolver.update_url(src)
    {
        *src = updated;
        changes += 1;
    }

    if let Some(Value::String(mime)) = icon.get_mut("type")
        && let Some(fixed) = repair_mime(mime)
    {
        *mime = fixed;
        changes += 1;
    }

    changes
}

/// Rewrite every resolvable string reachable from `value`.
fn rewrite_strings(value: &mut Value, resolver: &UrlResolver<'_>) -> usize {
    match value {
        Value::String(s) => match resolver.update_url(s) {
            Some(updated) => {
                *s = updated;
                1
            }
            None => 0,
        },
        Value::Array(items) => items.iter_mut().map(|v| rewrite_strings(v, resolver)).sum(),
        Value::Object(map) => map.values_mut().map(|v| rewrite_strings(v, resolver)).sum(),
        Value::Null | Value::Bool(_) | Value::Number(_) => 0,
    }
}

/// Collapse a repeated MIME type prefix: `image/image/png` → `image/png`.
///
/// Returns `None` when the type is already well formed.
pub fn repair_mime(mime: &str) -> Option<String> {
    let mut parts = mime.split('/');
    let first = parts.next()?;
    let mut rest: Vec<&str> = parts.collect();

    let repeated = rest.iter().take_while(|p| p.eq_ignore_ascii_case(first)).count();
    // Keep the subtype even for `image/image`
    let repeated = repeated.min(rest.len().saturating_sub(1));
    if repeated == 0 {
        return None;
    }
    rest.drain(..repeated);
    Some(format!("{first}/{}", rest.join("/")))
}
