//! Asset reference: how a document names an asset, and the file behind it.

use std::path::PathBuf;

use serde::Serialize;

/// A media reference found in a source document.
///
/// Created transiently by the scanner; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReference {
    /// Path as referenced, relative to the source root: POSIX separators,
    /// no query/fragment, no leading slash (e.g. `images/logo.png`).
    pub original_path: String,
    /// File backing the reference at scan time.
    pub full_path: PathBuf,
}
