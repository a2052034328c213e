//! Config field paths for diagnostics.

/// Dotted path of a field in `rehash.toml`, such as `assets.site_base_url`.
///
/// Each section exposes its paths as constants so diagnostics never carry a
/// misspelled field name:
///
/// ```ignore
/// diag.error(AssetConfig::FIELDS.site_base_url, "must be an http(s) URL");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}
