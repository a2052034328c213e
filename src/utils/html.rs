//! HTML utility functions.
//!
//! Provides the byte-preserving HTML helpers used by the rewriter:
//! - `escape_attr()`, `unescape()` - HTML entity handling for attribute values
//! - `tokenize()` - start tags with attribute value spans, raw-text bodies
//! - `apply_edits()` - splice replacements into the original source
//!
//! The lexer never re-serializes markup: every byte outside a replaced span
//! is copied through unchanged.

use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Get the HTML entity for a character that is special inside attributes.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML attribute values.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
/// Unknown entities are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        // Entities longer than this are not entities
        let Some(semi) = after.find(';').filter(|&i| i > 0 && i <= 10) else {
            result.push('&');
            rest = after;
            continue;
        };

        let entity = &after[..semi];
        match decode_entity(entity) {
            Some(c) => result.push(c),
            None => {
                result.push('&');
                result.push_str(entity);
                result.push(';');
            }
        }
        rest = &after[semi + 1..];
    }

    result.push_str(rest);
    Cow::Owned(result)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => {
            let num = entity.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => num.parse().ok(),
            };
            code.and_then(char::from_u32)
        }
    }
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if tag is a raw text element (content is not markup).
///
/// Per HTML spec: script and style content is "raw text", textarea and
/// title are "escapable raw text". Neither may contain child tags.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

// =============================================================================
// Lexer
// =============================================================================

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    /// Lowercased attribute name.
    pub name: String,
    /// Raw value as written (entities not decoded). Empty for boolean attributes.
    pub raw: &'a str,
    /// Byte range of the value inside the source, quotes excluded.
    pub value_span: Option<Range<usize>>,
}

impl Attr<'_> {
    /// Entity-decoded attribute value.
    pub fn value(&self) -> Cow<'_, str> {
        unescape(self.raw)
    }
}

/// A start tag such as `<img src="a.png" alt=x>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attr<'a>>,
    /// Byte range of the whole tag, `<` through `>`.
    pub span: Range<usize>,
    /// Byte range of the element body for raw-text elements (`script`, `style`).
    pub body: Option<Range<usize>>,
}

impl<'a> StartTag<'a> {
    /// First attribute with the given (lowercase) name.
    pub fn attr(&self, name: &str) -> Option<&Attr<'a>> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Decoded value of the named attribute.
    pub fn attr_value(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attr(name).map(Attr::value)
    }
}

/// Collect every start tag in document order.
///
/// Comments, doctypes, processing instructions and end tags are skipped.
/// Raw-text element bodies are not scanned for tags; their span is recorded
/// on the owning start tag instead.
pub fn tokenize(src: &str) -> Vec<StartTag<'_>> {
    let bytes = src.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = src[pos..].find('<') {
        let lt = pos + offset;
        let rest = &src[lt..];

        if rest.starts_with("<!--") {
            pos = find_from(src, lt + 4, "-->").map_or(src.len(), |end| end + 3);
            continue;
        }
        if rest.starts_with("</") || rest.starts_with("<!") || rest.starts_with("<?") {
            pos = find_from(src, lt + 1, ">").map_or(src.len(), |end| end + 1);
            continue;
        }
        if !bytes.get(lt + 1).is_some_and(u8::is_ascii_alphabetic) {
            pos = lt + 1;
            continue;
        }

        let (mut tag, self_closing) = parse_start_tag(src, lt);
        pos = tag.span.end;

        if is_raw_text_element(&tag.name) && !self_closing {
            let close = find_closing_tag(src, pos, &tag.name);
            tag.body = Some(pos..close);
            pos = close;
        }
        tags.push(tag);
    }

    tags
}

#[inline]
fn find_from(src: &str, from: usize, needle: &str) -> Option<usize> {
    src.get(from..)?.find(needle).map(|i| from + i)
}

/// Locate `</name` (ASCII case-insensitive) at or after `from`.
fn find_closing_tag(src: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{name}");
    let haystack = src[from..].to_ascii_lowercase();
    haystack.find(&needle).map_or(src.len(), |i| from + i)
}

/// Parse a start tag beginning at `lt` (the `<`).
///
/// All delimiters are ASCII, so every slice boundary is a char boundary.
fn parse_start_tag(src: &str, lt: usize) -> (StartTag<'_>, bool) {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut i = lt + 1;

    let name_start = i;
    while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'/' | b'>') {
        i += 1;
    }
    let name = src[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                self_closing = bytes.get(i + 1) == Some(&b'>');
                i += 1;
                continue;
            }
            _ => {}
        }

        // Attribute name
        let attr_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        // A lone `=` or similar garbage: consume one byte to guarantee progress
        if i == attr_start {
            i += 1;
            continue;
        }
        let attr_name = src[attr_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= len || bytes[j] != b'=' {
            attrs.push(Attr {
                name: attr_name,
                raw: "",
                value_span: None,
            });
            continue;
        }

        // Attribute value
        i = j + 1;
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let span = match bytes.get(i) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = i + 1;
                let end = src[start..]
                    .find(quote as char)
                    .map_or(len, |k| start + k);
                i = (end + 1).min(len);
                start..end
            }
            _ => {
                let start = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                start..i
            }
        };
        attrs.push(Attr {
            name: attr_name,
            raw: &src[span.clone()],
            value_span: Some(span),
        });
    }

    let tag = StartTag {
        name,
        attrs,
        span: lt..i,
        body: None,
    };
    (tag, self_closing)
}

// =============================================================================
// Splicing
// =============================================================================

/// A replacement of `span` in the source with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Range<usize>,
    pub text: String,
}

/// Apply non-overlapping edits to `src`.
///
/// Edits may be given in any order; overlapping edits after the first are dropped.
pub fn apply_edits(src: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.span.start);

    let mut out = String::with_capacity(src.len() + edits.len() * 16);
    let mut cursor = 0;
    for edit in edits {
        if edit.span.start < cursor {
            continue;
        }
        out.push_str(&src[cursor..edit.span.start]);
        out.push_str(&edit.text);
        cursor = edit.span.end;
    }
    out.push_str(&src[cursor..]);
    out
}

// =============================================================================
// Tests
// =============================================================================
