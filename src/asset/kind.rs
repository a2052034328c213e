//! Asset kind definitions.

use crate::utils::path::extension_of;

/// Image, video and icon formats that documents reference directly.
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "ico", "bmp", "mp4", "webm", "ogg", "mov",
];

/// Bundler outputs that are hashed alongside media.
pub const BUNDLE_EXTENSIONS: &[&str] = &["css", "js", "mjs", "json"];

/// Kind of asset, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Image, video or icon. The only kind the scanner reports.
    Media,
    /// Stylesheet, script or JSON emitted by the bundler.
    Bundle,
}

impl AssetKind {
    /// Classify a path or URL path by its extension (case-insensitive).
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = extension_of(path)?;
        if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Media)
        } else if BUNDLE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Bundle)
        } else {
            None
        }
    }

    /// Whether `path` is a media file the scanner should report.
    #[inline]
    pub fn is_media(path: &str) -> bool {
        Self::from_path(path) == Some(Self::Media)
    }
}
