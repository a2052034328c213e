//! URL processing utilities.
//!
//! Provides consistent URL handling across the codebase:
//! - Link type detection (external vs internal)
//! - Base URL stripping and query/fragment splitting
//! - Extension lookup on URL paths

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
///
/// Protocol-relative links (`//cdn.example.com/x.png`) count as external.
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.starts_with("//")
        || link.find(':').is_some_and(|pos| {
            pos > 0
                && link[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

/// Strip the site base URL from `url`.
///
/// Only matches on a path boundary: with base `https://a.com`,
/// `https://a.com/x.png` yields `/x.png` but `https://a.com.evil/x.png`
/// does not match.
pub fn strip_base<'a>(url: &'a str, base: &str) -> Option<&'a str> {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let rest = url.strip_prefix(base)?;
    (rest.is_empty() || rest.starts_with(['/', '?', '#'])).then_some(rest)
}

/// Split a URL into its path and the `?query#fragment` tail.
///
/// The tail keeps its leading delimiter so `path + tail` restores the input.
///
/// # Examples
/// ```ignore
/// assert_eq!(split_suffix("/a.png?v=1#top"), ("/a.png", "?v=1#top"));
/// assert_eq!(split_suffix("/a.png"), ("/a.png", ""));
/// ```
#[inline]
pub fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

/// Lowercased extension of the last path segment, if any.
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Strip leading slashes and a leading `./`.
///
/// # Examples
/// ```ignore
/// assert_eq!(trim_leading("//images/a.png"), "images/a.png");
/// assert_eq!(trim_leading("./a.png"), "a.png");
/// ```
#[inline]
pub fn trim_leading(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_start_matches('/')
}
