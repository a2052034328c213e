//! Document rewriting over the build output.
//!
//! Every `*.html` page and `manifest*.json` under the output root is
//! rewritten against the frozen asset mapping:
//!
//! ```text
//! client/
//! ├── index.html                    <img src="/logo.png">  -> /assets/logo-9f3ab21c.png
//! ├── blog/index.html               <meta content="https://site/og.png"> -> https://site/assets/og-….png
//! └── assets/manifest-5e6f7a8b.json {"icons": [{"src": "/icon.png"}]}
//! ```
//!
//! Documents are independent once the mapping is built, so they are
//! processed in parallel. A document is written only when its text changed.

mod html;
mod jsonld;
mod manifest;
mod url;

pub use url::UrlResolver;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::asset::AssetMapping;
use crate::config::AssetConfig;
use crate::logger::Logger;
use crate::utils::path::{posix_relative, walk_files};
use crate::{debug, error, info};

use html::rewrite_html;
use manifest::rewrite_manifest;

/// Totals for one rewrite pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Documents examined.
    pub documents: usize,
    /// Documents whose text changed (written unless dry-run).
    pub changed: usize,
    /// HTML values replaced, plus one per rewritten manifest.
    pub replacements: usize,
    /// Documents that could not be read or written.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Html,
    Manifest,
}

impl DocumentKind {
    fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".html") {
            Some(Self::Html)
        } else if name.starts_with("manifest") && name.ends_with(".json") {
            Some(Self::Manifest)
        } else {
            None
        }
    }
}

/// Outcome for a single document.
enum Outcome {
    Unchanged,
    Changed(usize),
    Failed,
}

/// Rewrite every HTML page and web manifest under `output_root`.
pub fn rewrite_output_tree(
    output_root: &Path,
    config: &AssetConfig,
    mapping: &AssetMapping,
    logger: &dyn Logger,
    dry_run: bool,
) -> RewriteReport {
    let documents = walk_files(output_root, &[], |p| DocumentKind::of(p).is_some());
    let manifest_href = find_hashed_manifest(&documents, output_root);
    if let Some(href) = &manifest_href {
        debug!(logger, "rewrite"; "web manifest is {}", href);
    }

    let resolver = UrlResolver::new(&config.site_base_url, mapping);
    let outcomes: Vec<Outcome> = documents
        .par_iter()
        .map(|path| {
            let rel = posix_relative(path, output_root).unwrap_or_else(|| path.display().to_string());
            match rewrite_document(path, &resolver, manifest_href.as_deref(), dry_run) {
                Ok(0) => Outcome::Unchanged,
                Ok(n) => {
                    info!(logger, "rewrite"; "{} ({} replacement(s))", rel, n);
                    Outcome::Changed(n)
                }
                Err(e) => {
                    error!(logger, "rewrite"; "{}: {:#}", rel, e);
                    Outcome::Failed
                }
            }
        })
        .collect();

    let mut report = RewriteReport {
        documents: documents.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::Changed(n) => {
                report.changed += 1;
                report.replacements += n;
            }
            Outcome::Failed => report.failed += 1,
        }
    }
    report
}

/// Output-relative path of the first `manifest-<hash>.json` in walk order.
fn find_hashed_manifest(documents: &[PathBuf], output_root: &Path) -> Option<String> {
    documents
        .iter()
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("manifest-") && n.ends_with(".json"))
        })
        .and_then(|p| posix_relative(p, output_root))
}

/// Rewrite one document, returning the number of replacements (0 = untouched).
fn rewrite_document(
    path: &Path,
    resolver: &UrlResolver<'_>,
    manifest_href: Option<&str>,
    dry_run: bool,
) -> Result<usize> {
    let Some(kind) = DocumentKind::of(path) else {
        return Ok(0);
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let (rewritten, replacements) = match kind {
        DocumentKind::Html => match rewrite_html(&text, resolver, manifest_href) {
            Some(edit) => (edit.text, edit.replacements),
            None => return Ok(0),
        },
        DocumentKind::Manifest => match rewrite_manifest(&text, resolver) {
            Some(out) => (out, 1),
            None => return Ok(0),
        },
    };

    if rewritten == text {
        return Ok(0);
    }
    if !dry_run {
        fs::write(path, rewritten).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(replacements)
}
