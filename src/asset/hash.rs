//! Content hashing and hashed-filename recognition.
//!
//! Hashed assets follow the `<name>-<hash>.<ext>` convention. The hash is
//! recognized by an explicit pattern with a configurable minimum length
//! rather than inferred from the bundler.

use std::path::Path;

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use regex::Regex;

/// Length of content hashes produced by [`content_hash`].
pub const HASH_LEN: usize = 8;

/// Longest accepted minimum for [`HashPattern`] (a full SHA-256 hex digest).
pub const MAX_HASH_LEN: usize = 64;

/// Compute a content hash (first 8 hex chars of the MD5 digest).
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    let mut hex = hex::encode(digest);
    hex.truncate(HASH_LEN);
    hex
}

/// Read a file and compute its content hash.
pub fn file_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content_hash(&bytes))
}

/// `<stem>-<hash>.<ext>`, or `<stem>-<hash>` without an extension.
pub fn hashed_file_name(stem: &str, hash: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}-{hash}.{ext}"),
        None => format!("{stem}-{hash}"),
    }
}

/// Recognizes `<name>-<hash>` file stems.
///
/// The hash is the segment after the final `-`: one or more of
/// `[A-Za-z0-9_]`, at least `min_len` long. Everything before it is the
/// original name.
#[derive(Debug, Clone)]
pub struct HashPattern {
    regex: Regex,
}

impl HashPattern {
    pub fn new(min_len: usize) -> Result<Self> {
        let min_len = min_len.max(1);
        let regex = Regex::new(&format!(r"^(?P<name>.+)-(?P<hash>[A-Za-z0-9_]{{{min_len},}})$"))
            .context("invalid hash pattern")?;
        Ok(Self { regex })
    }

    /// Split a hashed stem into `(name, hash)`.
    ///
    /// Returns `None` for stems that do not carry a hash suffix.
    pub fn split<'a>(&self, stem: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.regex.captures(stem)?;
        Some((caps.name("name")?.as_str(), caps.name("hash")?.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_is_md5_prefix() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_hash(b""), "d41d8cd9");
        // md5("hello") = 5d41402abc4b2a76b9719d911017c592
        assert_eq!(content_hash(b"hello"), "5d41402a");
    }

    #[test]
    fn test_file_hash() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("logo.png");
        fs::write(&file, "hello").unwrap();
        assert_eq!(file_hash(&file).unwrap(), "5d41402a");
        assert!(file_hash(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn test_hashed_file_name() {
        assert_eq!(hashed_file_name("logo", "ab12cd34", Some("png")), "logo-ab12cd34.png");
        assert_eq!(hashed_file_name("CNAME", "ab12cd34", None), "CNAME-ab12cd34");
    }

    #[test]
    fn test_pattern_split() {
        let pattern = HashPattern::new(8).unwrap();
        assert_eq!(pattern.split("logo-9f3ab21c"), Some(("logo", "9f3ab21c")));
        assert_eq!(pattern.split("index-B_x9Tz0a"), Some(("index", "B_x9Tz0a")));
        // Final dash decides
        assert_eq!(pattern.split("my-logo-9f3ab21c"), Some(("my-logo", "9f3ab21c")));
        // Too short, no dash, empty name
        assert_eq!(pattern.split("logo-abc"), None);
        assert_eq!(pattern.split("logo"), None);
        assert_eq!(pattern.split("-9f3ab21c"), None);
    }

    #[test]
    fn test_pattern_min_len_configurable() {
        let pattern = HashPattern::new(3).unwrap();
        assert_eq!(pattern.split("logo-abc"), Some(("logo", "abc")));
        assert_eq!(pattern.split("logo-ab"), None);
    }
}
