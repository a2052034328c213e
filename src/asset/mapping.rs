//! Output mapping: pre-hash logical path → hashed output path.
//!
//! Built from the bundler's output by recognizing the `<name>-<hash>.<ext>`
//! naming convention:
//!
//! ```text
//! client/assets/
//! ├── logo-9f3ab21c.png          logo.png          -> assets/logo-9f3ab21c.png
//! ├── images/
//! │   └── hero-0a1b2c3d.webp     images/hero.webp  -> assets/images/hero-0a1b2c3d.webp
//! └── robots.txt                 (not in allow-list, skipped)
//! ```
//!
//! Keys are relative to the assets subdirectory; for files at its root the
//! key is the bare file name. Values are relative to the output root. Both
//! are POSIX-separated on every platform.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use crate::logger::Logger;
use crate::utils::path::{posix_relative, walk_files};
use crate::{debug, info, warn};

use super::{AssetKind, HashPattern};

/// Mapping from source-relative asset path to output-relative hashed path.
///
/// Keys are unique; `insert` overwrites (last writer wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetMapping {
    entries: BTreeMap<String, String>,
}

impl AssetMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(&mut self, original: impl Into<String>, hashed: impl Into<String>) -> Option<String> {
        self.entries.insert(original.into(), hashed.into())
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AssetMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// Build the mapping for every hashed file under `<output_root>/<assets_subdir>`.
///
/// Files whose stem lacks a hash suffix are assumed stable and skipped.
/// When two different hashed files reconstruct to the same key, the key is
/// ambiguous: it is dropped, later claims are ignored, and a warning is
/// logged. The result therefore does not depend on enumeration order.
pub fn build_output_mapping(
    output_root: &Path,
    assets_subdir: &str,
    pattern: &HashPattern,
    logger: &dyn Logger,
) -> AssetMapping {
    let assets_dir = output_root.join(assets_subdir);
    let files = walk_files(&assets_dir, &[], |p| {
        p.to_str().is_some_and(|s| AssetKind::from_path(s).is_some())
    });

    let mut mapping = AssetMapping::new();
    let mut ambiguous = BTreeSet::new();

    for file in &files {
        let (Some(key), Some(value)) = (original_key(file, &assets_dir, pattern), posix_relative(file, output_root))
        else {
            continue;
        };

        if ambiguous.contains(&key) {
            continue;
        }
        match mapping.get(&key) {
            Some(existing) if existing != value => {
                warn!(logger, "map"; "`{}` is produced by both {} and {}; dropping ambiguous key", key, existing, value);
                mapping.entries.remove(&key);
                ambiguous.insert(key);
            }
            _ => {
                debug!(logger, "map"; "{} -> {}", key, value);
                mapping.insert(key, value);
            }
        }
    }

    info!(logger, "map"; "{} hashed asset(s) in {}", mapping.len(), assets_dir.display());
    mapping
}

/// Reconstruct the pre-hash key of a hashed output file.
///
/// `assets/images/hero-0a1b2c3d.webp` → `images/hero.webp`.
fn original_key(file: &Path, assets_dir: &Path, pattern: &HashPattern) -> Option<String> {
    let rel = posix_relative(file, assets_dir)?;
    let (dir, file_name) = match rel.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, rel.as_str()),
    };
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    };
    let (name, _hash) = pattern.split(stem)?;

    let base = match ext {
        Some(ext) => format!("{name}.{ext}"),
        None => name.to_string(),
    };
    Some(match dir {
        Some(dir) => format!("{dir}/{base}"),
        None => base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Level, RecordingLogger};
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_original_key() {
        let pattern = HashPattern::new(8).unwrap();
        let assets = Path::new("/out/assets");
        assert_eq!(
            original_key(Path::new("/out/assets/logo-9f3ab21c.png"), assets, &pattern).as_deref(),
            Some("logo.png")
        );
        assert_eq!(
            original_key(Path::new("/out/assets/images/hero-0a1b2c3d.webp"), assets, &pattern).as_deref(),
            Some("images/hero.webp")
        );
        assert_eq!(
            original_key(Path::new("/out/assets/logo.png"), assets, &pattern),
            None
        );
    }

    #[test]
    fn test_build_output_mapping() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        touch(out, "assets/logo-9f3ab21c.png");
        touch(out, "assets/images/hero-0a1b2c3d.webp");
        touch(out, "assets/index-B_x9Tz0a.js");
        touch(out, "assets/style-Qm3aZ01x.css");
        touch(out, "assets/stable.png");
        touch(out, "assets/notes-12345678.txt");
        touch(out, "index.html");

        let logger = RecordingLogger::new();
        let mapping = build_output_mapping(out, "assets", &HashPattern::new(8).unwrap(), &logger);

        assert_eq!(mapping.get("logo.png"), Some("assets/logo-9f3ab21c.png"));
        assert_eq!(mapping.get("images/hero.webp"), Some("assets/images/hero-0a1b2c3d.webp"));
        assert_eq!(mapping.get("index.js"), Some("assets/index-B_x9Tz0a.js"));
        assert_eq!(mapping.get("style.css"), Some("assets/style-Qm3aZ01x.css"));
        assert!(!mapping.contains("stable.png"));
        assert!(!mapping.contains("notes.txt"));
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn test_hash_pattern_invariant_holds_for_every_entry() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        for rel in [
            "assets/a-11111111.png",
            "assets/x/b-22222222.svg",
            "assets/x/y/my-file-33333333.mp4",
        ] {
            touch(out, rel);
        }

        let logger = RecordingLogger::new();
        let pattern = HashPattern::new(8).unwrap();
        let mapping = build_output_mapping(out, "assets", &pattern, &logger);
        assert_eq!(mapping.len(), 3);

        for (key, value) in mapping.iter() {
            let key_name = key.rsplit('/').next().unwrap();
            let (key_stem, key_ext) = key_name.rsplit_once('.').unwrap();
            let value_name = value.rsplit('/').next().unwrap();
            let (value_stem, value_ext) = value_name.rsplit_once('.').unwrap();
            let (name, hash) = pattern.split(value_stem).unwrap();
            assert_eq!(name, key_stem);
            assert_eq!(value_ext, key_ext);
            assert!(hash.len() >= 8);
        }
    }

    #[test]
    fn test_ambiguous_key_is_dropped() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        touch(out, "assets/logo-aaaaaaaa.svg");
        touch(out, "assets/logo-bbbbbbbb.svg");
        touch(out, "assets/logo-cccccccc.svg");
        touch(out, "assets/icon-dddddddd.png");

        let logger = RecordingLogger::new();
        let mapping = build_output_mapping(out, "assets", &HashPattern::new(8).unwrap(), &logger);

        assert!(!mapping.contains("logo.svg"));
        assert_eq!(mapping.get("icon.png"), Some("assets/icon-dddddddd.png"));
        assert_eq!(logger.at(Level::Warn).len(), 1);
    }

    #[test]
    fn test_missing_assets_dir() {
        let dir = TempDir::new().unwrap();
        let logger = RecordingLogger::new();
        let mapping = build_output_mapping(dir.path(), "assets", &HashPattern::new(8).unwrap(), &logger);
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_mapping_last_writer_wins() {
        let mut mapping = AssetMapping::new();
        assert_eq!(mapping.insert("a.png", "assets/a-1.png"), None);
        assert_eq!(mapping.insert("a.png", "assets/a-2.png").as_deref(), Some("assets/a-1.png"));
        assert_eq!(mapping.get("a.png"), Some("assets/a-2.png"));
    }

    #[test]
    fn test_mapping_serializes_as_object() {
        let mapping: AssetMapping = [("b.png", "assets/b-2.png"), ("a.png", "assets/a-1.png")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"a.png":"assets/a-1.png","b.png":"assets/b-2.png"}"#);
    }
}
