//! URL resolution against the asset mapping.
//!
//! | Input form | Example (base `https://test.com`) | Rewritten |
//! |------------|-----------------------------------|-----------|
//! | Absolute | `https://test.com/images/a.png` | `https://test.com/assets/images/a-1234abcd.png` |
//! | Site-relative | `/images/a.png` | `/assets/images/a-1234abcd.png` |
//! | Bare | `images/a.png` | `/assets/images/a-1234abcd.png` |
//! | Unmapped | `/missing.png` | unchanged |
//!
//! Query strings and fragments are carried over verbatim.

use crate::asset::AssetMapping;
use crate::utils::path::{split_suffix, strip_base};

/// Resolves asset URLs to their hashed form. Read-only once constructed.
#[derive(Debug, Clone, Copy)]
pub struct UrlResolver<'a> {
    base_url: &'a str,
    mapping: &'a AssetMapping,
}

impl<'a> UrlResolver<'a> {
    pub fn new(base_url: &'a str, mapping: &'a AssetMapping) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/'),
            mapping,
        }
    }

    /// Rewrite `url` if it names a mapped asset.
    ///
    /// Returns `None` when the URL is unmapped or already resolves to itself;
    /// callers keep the original value in that case.
    pub fn update_url(&self, url: &str) -> Option<String> {
        let trimmed = url.trim();
        let (absolute, local) = match strip_base(trimmed, self.base_url) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (path, suffix) = split_suffix(local);
        let key = path.trim_start_matches('/');
        if key.is_empty() {
            return None;
        }
        let hashed = self.mapping.get(key)?;

        let rebuilt = self.format(hashed, absolute, suffix);
        (rebuilt != url).then_some(rebuilt)
    }

    /// Build a URL for an output-relative path in the requested form.
    pub fn format(&self, output_path: &str, absolute: bool, suffix: &str) -> String {
        if absolute {
            format!("{}/{output_path}{suffix}", self.base_url)
        } else {
            format!("/{output_path}{suffix}")
        }
    }

    /// Whether `url` carries the site base URL.
    pub fn is_absolute(&self, url: &str) -> bool {
        strip_base(url.trim(), self.base_url).is_some()
    }
}
