//! Asset reference scanning over source documents.
//!
//! Finds every media reference a source document makes, including the ones
//! a bundler's import graph never sees:
//!
//! ```text
//! <meta property="og:image" content="https://site/images/og.png">  -> images/og.png
//! <img src="/images/logo.png" srcset="/a.png 1x, /b.png 2x">       -> images/logo.png, a.png, b.png
//! <script type="application/ld+json">{"logo": "/brand.svg"}</script> -> brand.svg
//! manifest.json  {"icons": [{"src": "/icons/icon.png"}]}            -> icons/icon.png
//! ```
//!
//! JSON is walked structurally: every string anywhere in the value is a
//! candidate, regardless of its key.
//!
//! # Pure Function
//!
//! Scanning only reads the filesystem. Results are de-duplicated by
//! `original_path` and ordered by discovery (document order, JSON insertion
//! order, sorted file walk), so repeated scans of the same tree agree.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::logger::Logger;
use crate::utils::html::{StartTag, tokenize};
use crate::utils::json::{literal_value, string_literals};
use crate::utils::path::{is_external_link, split_suffix, strip_base, trim_leading, walk_files};
use crate::{debug, warn};

use super::{AssetKind, AssetReference};

/// `meta` property/name prefixes whose `content` is an asset URL.
const META_PREFIXES: &[&str] = &["og:image", "twitter:image", "twitter:player:stream"];

const LD_JSON: &str = "application/ld+json";

/// Scans documents against one source tree.
pub struct Scanner<'a> {
    base_url: &'a str,
    source_dir: &'a Path,
    excluded: Vec<PathBuf>,
    logger: &'a dyn Logger,
    /// File name -> first matching file in the sorted source walk.
    by_name: OnceCell<FxHashMap<String, PathBuf>>,
}

/// Ordered, de-duplicated reference set.
#[derive(Default)]
struct Collector {
    refs: Vec<AssetReference>,
    seen: FxHashSet<String>,
}

impl Collector {
    fn push(&mut self, reference: AssetReference) {
        if self.seen.insert(reference.original_path.clone()) {
            self.refs.push(reference);
        }
    }
}

impl<'a> Scanner<'a> {
    pub fn new(base_url: &'a str, source_dir: &'a Path, logger: &'a dyn Logger) -> Self {
        Self {
            base_url,
            source_dir,
            excluded: Vec::new(),
            logger,
            by_name: OnceCell::new(),
        }
    }

    /// Directories under the source root that are never walked (e.g. the build output).
    pub fn with_excluded(mut self, excluded: Vec<PathBuf>) -> Self {
        self.excluded = excluded;
        self
    }

    // ------------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------------

    /// Source-relative path a string refers to, if it names a media file.
    ///
    /// Strips the base URL, query/fragment and leading slashes. Other origins,
    /// `data:` URIs and non-media extensions yield `None`.
    pub fn source_key(&self, value: &str) -> Option<String> {
        let value = value.trim();
        let local = match strip_base(value, self.base_url) {
            Some(rest) => rest,
            None if is_external_link(value) => return None,
            None => value,
        };
        let (path, _) = split_suffix(local);
        let key = trim_leading(path);
        (!key.is_empty() && AssetKind::is_media(key)).then(|| key.to_string())
    }

    /// Scan one string value.
    pub fn scan_str(&self, value: &str) -> Option<AssetReference> {
        let key = self.source_key(value)?;
        match self.resolve(&key) {
            Some(full_path) => Some(AssetReference {
                original_path: key,
                full_path,
            }),
            None => {
                debug!(self.logger, "scan"; "dropped `{}`: no such file under {}", key, self.source_dir.display());
                None
            }
        }
    }

    /// Locate the file behind a key: exact path first, then by file name.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let exact = self.source_dir.join(key);
        if exact.is_file() {
            return Some(exact);
        }

        let name = key.rsplit('/').next()?;
        let found = self.name_index().get(name)?.clone();
        warn!(self.logger, "scan"; "`{}` resolved by file name to {}", key, found.display());
        Some(found)
    }

    fn name_index(&self) -> &FxHashMap<String, PathBuf> {
        self.by_name.get_or_init(|| {
            let mut index = FxHashMap::default();
            for path in walk_files(self.source_dir, &self.excluded, |_| true) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    index.entry(name.to_string()).or_insert(path);
                }
            }
            index
        })
    }

    // ------------------------------------------------------------------------
    // JSON
    // ------------------------------------------------------------------------

    /// Every asset reference anywhere in a JSON value.
    pub fn scan_json(&self, value: &Value) -> Vec<AssetReference> {
        let mut out = Collector::default();
        self.collect_json(value, &mut out);
        out.refs
    }

    fn collect_json(&self, value: &Value, out: &mut Collector) {
        match value {
            Value::String(s) => {
                if let Some(reference) = self.scan_str(s) {
                    out.push(reference);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect_json(item, out);
                }
            }
            Value::Object(map) => {
                for item in map.values() {
                    self.collect_json(item, out);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// JSON text, falling back to its raw string literals when it does not parse.
    fn collect_json_text(&self, text: &str, origin: &str, out: &mut Collector) {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => {
                for reference in self.scan_json(&value) {
                    out.push(reference);
                }
            }
            Err(e) => {
                debug!(self.logger, "scan"; "{}: invalid JSON ({}), scanning raw strings", origin, e);
                for span in string_literals(text) {
                    if let Some(reference) = self.scan_str(&literal_value(&text[span])) {
                        out.push(reference);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // HTML
    // ------------------------------------------------------------------------

    /// Asset references in an HTML document, in document order.
    #[allow(dead_code)]
    pub fn scan_html(&self, html: &str) -> Vec<AssetReference> {
        let mut out = Collector::default();
        self.collect_html(html, "<html>", &mut out);
        out.refs
    }

    fn collect_html(&self, html: &str, origin: &str, out: &mut Collector) {
        for tag in tokenize(html) {
            let mut candidates = Vec::new();
            match tag.name.as_str() {
                "meta" if is_asset_meta(&tag) => {
                    candidates.extend(tag.attr_value("content").map(Cow::into_owned));
                }
                "img" => {
                    candidates.extend(tag.attr_value("src").map(Cow::into_owned));
                    candidates.extend(tag.attr_value("srcset").map(|s| srcset_urls(&s)).unwrap_or_default());
                }
                "source" => {
                    candidates.extend(tag.attr_value("srcset").map(|s| srcset_urls(&s)).unwrap_or_default());
                }
                "script" if is_ld_json(&tag) => {
                    if let Some(body) = tag.body.clone() {
                        self.collect_json_text(&html[body], origin, out);
                    }
                }
                _ => {}
            }

            for candidate in candidates {
                if let Some(reference) = self.scan_str(&candidate) {
                    out.push(reference);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Source tree
    // ------------------------------------------------------------------------

    /// References from every HTML page plus the root `manifest.json`.
    pub fn scan_source_tree(&self) -> Vec<AssetReference> {
        let mut out = Collector::default();

        let pages = walk_files(self.source_dir, &self.excluded, |p| {
            p.extension().is_some_and(|e| e.eq_ignore_ascii_case("html"))
        });
        for page in &pages {
            let origin = page.display().to_string();
            match fs::read_to_string(page) {
                Ok(html) => self.collect_html(&html, &origin, &mut out),
                Err(e) => warn!(self.logger, "scan"; "cannot read {}: {}", origin, e),
            }
        }

        let manifest = self.source_dir.join("manifest.json");
        if manifest.is_file() {
            match fs::read_to_string(&manifest) {
                Ok(text) => self.collect_json_text(&text, "manifest.json", &mut out),
                Err(e) => warn!(self.logger, "scan"; "cannot read {}: {}", manifest.display(), e),
            }
        }

        debug!(self.logger, "scan"; "{} page(s), {} reference(s)", pages.len(), out.refs.len());
        out.refs
    }
}

/// `meta` whose `property` or `name` marks its `content` as an asset URL.
fn is_asset_meta(tag: &StartTag<'_>) -> bool {
    ["property", "name"].iter().any(|key| {
        tag.attr_value(key)
            .is_some_and(|v| META_PREFIXES.iter().any(|pre| v.trim().starts_with(pre)))
    })
}

fn is_ld_json(tag: &StartTag<'_>) -> bool {
    tag.attr_value("type")
        .is_some_and(|t| t.trim().eq_ignore_ascii_case(LD_JSON))
}

/// URL components of a `srcset` value (`url [descriptor], ...`).
pub fn srcset_urls(srcset: &str) -> Vec<String> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Level, RecordingLogger};
    use tempfile::TempDir;

    const BASE: &str = "https://test.com";

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn keys(refs: &[AssetReference]) -> Vec<&str> {
        refs.iter().map(|r| r.original_path.as_str()).collect()
    }

    #[test]
    fn test_source_key() {
        let dir = TempDir::new().unwrap();
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        assert_eq!(scanner.source_key("https://test.com/images/a.png?v=2").as_deref(), Some("images/a.png"));
        assert_eq!(scanner.source_key("//images/a.png#x").as_deref(), None);
        assert_eq!(scanner.source_key("/images/a.png#x").as_deref(), Some("images/a.png"));
        assert_eq!(scanner.source_key("./a.webp").as_deref(), Some("a.webp"));
        assert_eq!(scanner.source_key("https://cdn.other.com/a.png"), None);
        assert_eq!(scanner.source_key("data:image/png;base64,AAAA"), None);
        assert_eq!(scanner.source_key("/report.pdf"), None);
        assert_eq!(scanner.source_key("/"), None);
    }

    #[test]
    fn test_scan_str_exact_and_missing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "images/logo.png", "png");
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let found = scanner.scan_str("/images/logo.png").unwrap();
        assert_eq!(found.original_path, "images/logo.png");
        assert_eq!(found.full_path, dir.path().join("images/logo.png"));

        assert!(scanner.scan_str("/images/missing.png").is_none());
        assert!(logger.at(Level::Warn).is_empty());
    }

    #[test]
    fn test_scan_str_basename_fallback_is_observable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "public/brand/logo.svg", "<svg/>");
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let found = scanner.scan_str("/logo.svg").unwrap();
        assert_eq!(found.original_path, "logo.svg");
        assert_eq!(found.full_path, dir.path().join("public/brand/logo.svg"));

        let warnings = logger.at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("logo.svg"));
    }

    #[test]
    fn test_scan_json_walks_every_string() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.png", "");
        write(dir.path(), "deep/b.jpg", "");
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let value: Value = serde_json::from_str(
            r#"{"whatever": "/a.png", "nested": {"list": [1, null, "https://test.com/deep/b.jpg"]}, "text": "hello"}"#,
        )
        .unwrap();
        assert_eq!(keys(&scanner.scan_json(&value)), vec!["a.png", "deep/b.jpg"]);
    }

    #[test]
    fn test_scan_html_document_order() {
        let dir = TempDir::new().unwrap();
        for rel in ["og.png", "tw.jpg", "img.png", "a.png", "b.png", "brand.svg", "stream.mp4", "desc.png"] {
            write(dir.path(), rel, "");
        }
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let html = r#"<!DOCTYPE html><html><head>
            <meta property="og:image" content="https://test.com/og.png">
            <meta name="twitter:image:src" content="/tw.jpg">
            <meta name="twitter:player:stream" content="/stream.mp4">
            <meta name="description" content="/desc.png">
            <script type="application/ld+json">{"@type": "Organization", "logo": "/brand.svg"}</script>
            </head><body>
            <img src="/img.png" srcset="/a.png 1x, /b.png 2x">
            <img src="/og.png">
            </body></html>"#;

        assert_eq!(
            keys(&scanner.scan_html(html)),
            vec!["og.png", "tw.jpg", "stream.mp4", "brand.svg", "img.png", "a.png", "b.png"]
        );
    }

    #[test]
    fn test_scan_html_case_insensitive_markup() {
        let dir = TempDir::new().unwrap();
        for rel in ["og.png", "img.png", "a.png", "brand.svg"] {
            write(dir.path(), rel, "");
        }
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let html = r#"<META PROPERTY="og:image" CONTENT="/og.png">
            <IMG SRC="/img.png" SrcSet="/a.png 2x">
            <SCRIPT TYPE="Application/LD+JSON">{"logo": "/brand.svg"}</SCRIPT>"#;
        assert_eq!(keys(&scanner.scan_html(html)), vec!["og.png", "img.png", "a.png", "brand.svg"]);
    }

    #[test]
    fn test_scan_html_meta_property_or_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tw.png", "");
        write(dir.path(), "og.png", "");
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let html = r#"<meta property="og:title" name="twitter:image" content="/tw.png">
            <meta name="description" property="og:image:secure_url" content="/og.png">
            <meta property="og:title" name="description" content="/tw.png">"#;
        assert_eq!(keys(&scanner.scan_html(html)), vec!["tw.png", "og.png"]);
    }

    #[test]
    fn test_scan_html_invalid_ld_json_falls_back() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "brand.svg", "");
        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, dir.path(), &logger);

        let html = r#"<script type="application/ld+json">{"logo": "/brand.svg",}</script>"#;
        assert_eq!(keys(&scanner.scan_html(html)), vec!["brand.svg"]);
    }

    #[test]
    fn test_scan_source_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "index.html", r#"<meta property="og:image" content="/images/og.png">"#);
        write(root, "blog/index.html", r#"<img src="/images/og.png"><img src="/images/post.jpg">"#);
        write(root, "manifest.json", r#"{"icons": [{"src": "/icons/icon.png", "type": "image/png"}]}"#);
        write(root, "images/og.png", "");
        write(root, "images/post.jpg", "");
        write(root, "icons/icon.png", "");
        write(root, "dist/index.html", r#"<img src="/images/built.png">"#);
        write(root, "images/built.png", "");

        let logger = RecordingLogger::new();
        let scanner = Scanner::new(BASE, root, &logger).with_excluded(vec![root.join("dist")]);
        let first = scanner.scan_source_tree();
        assert_eq!(
            keys(&first),
            vec!["images/og.png", "images/post.jpg", "icons/icon.png"]
        );

        // Deterministic across runs
        let again = Scanner::new(BASE, root, &logger)
            .with_excluded(vec![root.join("dist")])
            .scan_source_tree();
        assert_eq!(first, again);
    }

    #[test]
    fn test_srcset_urls() {
        assert_eq!(srcset_urls("/a.png 1x, /b.png 2x"), vec!["/a.png", "/b.png"]);
        assert_eq!(srcset_urls("/a.png"), vec!["/a.png"]);
        assert!(srcset_urls(" , ").is_empty());
    }
}
