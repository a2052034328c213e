//! `map` and `scan` commands: inspect the pass without rewriting anything.
//!
//! Both print JSON on stdout; log lines go to stderr.

use anyhow::Result;
use serde::Serialize;

use crate::asset::{AssetMapping, AssetReference, HashPattern, Scanner, build_output_mapping, reconcile};
use crate::config::RehashConfig;
use crate::logger::Logger;
use crate::{info, warn};

/// Print the output mapping, optionally merged with reconciler entries.
pub fn run_map(config: &RehashConfig, logger: &dyn Logger, with_reconcile: bool, pretty: bool) -> Result<()> {
    let mapping = collect_mapping(config, logger, with_reconcile)?;
    info!(logger, "map"; "{} entr{}", mapping.len(), if mapping.len() == 1 { "y" } else { "ies" });
    println!("{}", to_json(&mapping, pretty)?);
    Ok(())
}

/// Print every asset reference in the source tree.
pub fn run_scan(config: &RehashConfig, logger: &dyn Logger, pretty: bool) -> Result<()> {
    let references = collect_references(config, logger);
    info!(logger, "scan"; "{} reference(s) under {}", references.len(), config.assets.src_dir.display());
    println!("{}", to_json(&references, pretty)?);
    Ok(())
}

fn collect_mapping(config: &RehashConfig, logger: &dyn Logger, with_reconcile: bool) -> Result<AssetMapping> {
    let assets = &config.assets;
    let output_root = assets.client_output_dir();
    if !output_root.is_dir() {
        warn!(logger, "map"; "client output directory {} not found", output_root.display());
    }

    let pattern = HashPattern::new(config.hash.min_length)?;
    let mapping = build_output_mapping(&output_root, &assets.assets_subdir, &pattern, logger);
    if !with_reconcile {
        return Ok(mapping);
    }
    // Dry run: plan the copies without touching the output
    Ok(reconcile(mapping, &output_root, assets, logger, true).mapping)
}

fn collect_references(config: &RehashConfig, logger: &dyn Logger) -> Vec<AssetReference> {
    let assets = &config.assets;
    Scanner::new(&assets.site_base_url, &assets.src_dir, logger)
        .with_excluded(vec![assets.output_dir.clone()])
        .scan_source_tree()
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
