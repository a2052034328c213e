//! Missing-asset reconciliation.
//!
//! Assets referenced only from places the bundler ignores (meta tags,
//! JSON-LD, manifest icons) never reach its output. For each such reference
//! the source file is copied into the assets directory under a fresh content
//! hash and the mapping is extended:
//!
//! ```text
//! source:  images/og.png                (referenced by <meta property="og:image">)
//! output:  client/assets/images/og-5d41402a.png
//! mapping: images/og.png -> assets/images/og-5d41402a.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::AssetConfig;
use crate::logger::Logger;
use crate::utils::path::to_posix;
use crate::{debug, error, info};

use super::hash::{file_hash, hashed_file_name};
use super::{AssetMapping, AssetReference, Scanner};

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    /// Input mapping plus every recovered entry.
    pub mapping: AssetMapping,
    /// Number of missing assets copied (or, in dry-run, planned).
    pub recovered: usize,
    /// Number of missing assets whose copy failed.
    pub failed: usize,
}

/// Copy every referenced-but-unmapped source asset into the output.
///
/// References are recomputed from the source tree. A failure for one asset is
/// logged and skipped; existing entries are never touched. With `dry_run`,
/// nothing is written but the planned entries are still added.
pub fn reconcile(
    mapping: AssetMapping,
    output_root: &Path,
    config: &AssetConfig,
    logger: &dyn Logger,
    dry_run: bool,
) -> Reconciled {
    let scanner = Scanner::new(&config.site_base_url, &config.src_dir, logger)
        .with_excluded(vec![config.output_dir.clone()]);
    let references = scanner.scan_source_tree();

    let missing: Vec<&AssetReference> = references
        .iter()
        .filter(|r| !mapping.contains(&r.original_path))
        .collect();

    let mut result = Reconciled {
        mapping,
        ..Default::default()
    };
    if missing.is_empty() {
        debug!(logger, "reconcile"; "all {} reference(s) already mapped", references.len());
        return result;
    }

    let assets_dir = output_root.join(&config.assets_subdir);
    for reference in missing {
        match recover(reference, &assets_dir, dry_run) {
            Ok(target) => {
                let Some(hashed) = target
                    .strip_prefix(output_root)
                    .ok()
                    .map(to_posix)
                else {
                    continue;
                };
                info!(logger, "reconcile"; "{} -> {}", reference.original_path, hashed);
                result.mapping.insert(reference.original_path.clone(), hashed);
                result.recovered += 1;
            }
            Err(e) => {
                error!(logger, "reconcile"; "failed to copy {}: {:#}", reference.full_path.display(), e);
                result.failed += 1;
            }
        }
    }

    result
}

/// Target path for a missing asset, copying it unless `dry_run`.
fn recover(reference: &AssetReference, assets_dir: &Path, dry_run: bool) -> Result<PathBuf> {
    let hash = file_hash(&reference.full_path)?;
    let target = hashed_target(&reference.original_path, &hash, assets_dir);

    if !dry_run {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&reference.full_path, &target)
            .with_context(|| format!("failed to write {}", target.display()))?;
    }
    Ok(target)
}

/// `images/og.png` + `5d41402a` → `<assets_dir>/images/og-5d41402a.png`.
fn hashed_target(original_path: &str, hash: &str, assets_dir: &Path) -> PathBuf {
    let (dir, file_name) = match original_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, original_path),
    };
    let name = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => hashed_file_name(stem, hash, Some(ext)),
        _ => hashed_file_name(file_name, hash, None),
    };

    let mut target = assets_dir.to_path_buf();
    if let Some(dir) = dir {
        target.extend(dir.split('/').filter(|s| !s.is_empty() && *s != "." && *s != ".."));
    }
    target.join(name)
}
