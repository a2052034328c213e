//! JSON-LD structured data rewriting.
//!
//! Discovery is broad, but rewriting structured data is keyed by field name
//! to avoid touching values that merely look like URLs:
//!
//! - string values under `image`, `logo`, `thumbnail`, `url`, or any key
//!   containing `image`/`Image` (`contentImage`, `imageUrl`, ...)
//! - `{ "url": "..." }` objects under an image-like key
//! - string array elements that look like URLs (contain `http` or start with `/`)

use serde_json::{Map, Value};

use crate::utils::json::rewrite_literals;

use super::UrlResolver;

const URL_KEYS: &[&str] = &["image", "logo", "thumbnail", "url"];

/// Whether a value under `key` is rewritten.
#[inline]
fn is_url_key(key: &str) -> bool {
    URL_KEYS.contains(&key) || key.contains("image") || key.contains("Image")
}

#[inline]
fn looks_like_url(s: &str) -> bool {
    s.contains("http") || s.starts_with('/')
}

/// Rewritten script body, or `None` when nothing changed.
///
/// Parsed bodies are re-serialized with two-space indentation. Bodies that
/// fail to parse have their raw string literals rewritten instead.
pub fn rewrite_jsonld(body: &str, resolver: &UrlResolver<'_>) -> Option<String> {
    let Ok(mut value) = serde_json::from_str::<Value>(body) else {
        return rewrite_literals(body, |s| resolver.update_url(s));
    };

    if rewrite_value(&mut value, None, resolver) == 0 {
        return None;
    }
    let pretty = serde_json::to_string_pretty(&value).ok()?;
    // A `</script>` inside a string would end the element early
    Some(pretty.replace("</", "<\\/"))
}

/// Walk a JSON-LD value; `key` is the field the value sits under.
fn rewrite_value(value: &mut Value, key: Option<&str>, resolver: &UrlResolver<'_>) -> usize {
    match value {
        Value::String(s) if key.is_some_and(is_url_key) => replace(s, resolver),
        Value::Array(items) => items
            .iter_mut()
            .map(|item| match item {
                Value::String(s) if looks_like_url(s) => replace(s, resolver),
                // Arrays inherit the key: "image": ["/a.png", {"url": ...}]
                other => rewrite_value(other, key, resolver),
            })
            .sum(),
        Value::Object(map) => rewrite_object(map, key, resolver),
        _ => 0,
    }
}

fn rewrite_object(map: &mut Map<String, Value>, key: Option<&str>, resolver: &UrlResolver<'_>) -> usize {
    let mut changes = 0;

    // ImageObject-like: {"url": "..."} under an image-like key
    if key.is_some_and(is_url_key)
        && let Some(Value::String(url)) = map.get_mut("url")
    {
        changes += replace(url, resolver);
    }

    for (field, child) in map.iter_mut() {
        if field == "url" && matches!(child, Value::String(_)) && key.is_some_and(is_url_key) {
            continue;
        }
        changes += rewrite_value(child, Some(field), resolver);
    }
    changes
}

fn replace(s: &mut String, resolver: &UrlResolver<'_>) -> usize {
    match resolver.update_url(s) {
        Some(updated) => {
            *s = updated;
            1
        }
        None => 0,
    }
}
