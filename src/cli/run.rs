//! The post-bundle hook.
//!
//! One pass per build, strictly in order:
//!
//! ```text
//! build_output_mapping ──► reconcile ──► rewrite_output_tree
//!   (client/assets)        (src tree)     (client/**/*.html, manifest*.json)
//! ```
//!
//! The pass never fails the host build: a missing client directory is
//! reported and skipped, per-file problems are logged and absorbed.

use anyhow::Result;

use crate::asset::{HashPattern, build_output_mapping, reconcile};
use crate::config::RehashConfig;
use crate::logger::Logger;
use crate::rewrite::{RewriteReport, rewrite_output_tree};
use crate::{debug, error, info};

/// Which half of the host build invoked the hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildPhase {
    /// Host passed `--ssr` (client and worker are built in one go).
    pub ssr: bool,
    /// The worker environment marker is set.
    pub worker_marker: bool,
}

impl BuildPhase {
    /// Read the worker marker from the environment variable named in `[hook]`.
    pub fn detect(ssr: bool, config: &RehashConfig) -> Self {
        Self {
            ssr,
            worker_marker: config.hook.worker_marker_set(),
        }
    }

    /// The worker half of an SSR build never touches the client tree.
    pub const fn is_worker(&self) -> bool {
        self.ssr && self.worker_marker
    }
}

/// What a hook invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Worker phase of an SSR build; nothing to do.
    SkippedWorkerPhase,
    /// The client output directory does not exist.
    MissingOutput,
    /// The full pass ran.
    Completed {
        mapped: usize,
        recovered: usize,
        failed_copies: usize,
        rewrite: RewriteReport,
    },
}

/// Run build → reconcile → rewrite against the client output.
pub fn run_hook(
    config: &RehashConfig,
    phase: &BuildPhase,
    logger: &dyn Logger,
    dry_run: bool,
) -> Result<HookOutcome> {
    if phase.is_worker() {
        debug!(logger, "run"; "worker build phase, skipping");
        return Ok(HookOutcome::SkippedWorkerPhase);
    }

    let assets = &config.assets;
    let output_root = assets.client_output_dir();
    if !output_root.is_dir() {
        error!(logger, "run"; "client output directory {} not found, skipping asset rewrite", output_root.display());
        return Ok(HookOutcome::MissingOutput);
    }

    let pattern = HashPattern::new(config.hash.min_length)?;
    let mapping = build_output_mapping(&output_root, &assets.assets_subdir, &pattern, logger);
    let mapped = mapping.len();

    let reconciled = reconcile(mapping, &output_root, assets, logger, dry_run);
    let rewrite = rewrite_output_tree(&output_root, assets, &reconciled.mapping, logger, dry_run);

    info!(
        logger, "run";
        "{}{} mapped, {} recovered, {}/{} document(s) updated ({} replacement(s))",
        if dry_run { "[dry run] " } else { "" },
        mapped,
        reconciled.recovered,
        rewrite.changed,
        rewrite.documents,
        rewrite.replacements
    );
    if reconciled.failed > 0 || rewrite.failed > 0 {
        error!(
            logger, "run";
            "{} asset copy failure(s), {} document failure(s)",
            reconciled.failed,
            rewrite.failed
        );
    }

    Ok(HookOutcome::Completed {
        mapped,
        recovered: reconciled.recovered,
        failed_copies: reconciled.failed,
        rewrite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssetConfig, HashConfig, HookConfig};
    use crate::logger::{Level, RecordingLogger};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> (TempDir, RehashConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let config = RehashConfig {
            config_path: root.join("rehash.toml"),
            root: root.to_path_buf(),
            assets: AssetConfig {
                src_dir: root.join("src"),
                output_dir: root.join("dist"),
                assets_subdir: "assets".into(),
                site_base_url: "https://test.com".into(),
                client_subdir: "client".into(),
            },
            hash: HashConfig::default(),
            hook: HookConfig::default(),
        };
        (dir, config)
    }

    #[test]
    fn test_worker_phase_is_skipped() {
        let (_dir, config) = fixture();
        let logger = RecordingLogger::new();
        let phase = BuildPhase {
            ssr: true,
            worker_marker: true,
        };
        assert_eq!(
            run_hook(&config, &phase, &logger, false).unwrap(),
            HookOutcome::SkippedWorkerPhase
        );
    }

    #[test]
    fn test_phase_detection() {
        assert!(!BuildPhase { ssr: true, worker_marker: false }.is_worker());
        assert!(!BuildPhase { ssr: false, worker_marker: true }.is_worker());
        assert!(BuildPhase { ssr: true, worker_marker: true }.is_worker());
    }

    #[test]
    fn test_missing_output_fails_soft() {
        let (_dir, config) = fixture();
        let logger = RecordingLogger::new();
        let outcome = run_hook(&config, &BuildPhase::default(), &logger, false).unwrap();
        assert_eq!(outcome, HookOutcome::MissingOutput);
        assert_eq!(logger.at(Level::Error).len(), 1);
    }

    #[test]
    fn test_full_pass() {
        let (_dir, config) = fixture();
        let src = &config.assets.src_dir;
        let client = config.assets.client_output_dir();

        // Source: logo seen by the bundler, og image only in a meta tag
        let page = r#"<meta property="og:image" content="https://test.com/images/og.png"><img src="/images/logo.png">"#;
        write(src, "index.html", page);
        write(src, "images/og.png", "og bytes");
        write(src, "images/logo.png", "logo bytes");

        write(&client, "index.html", page);
        write(&client, "assets/images/logo-9f3ab21c.png", "logo bytes");

        let logger = RecordingLogger::new();
        let outcome = run_hook(&config, &BuildPhase::default(), &logger, false).unwrap();
        let HookOutcome::Completed { mapped, recovered, rewrite, .. } = outcome else {
            panic!("expected a completed pass, got {outcome:?}");
        };
        assert_eq!(mapped, 1);
        assert_eq!(recovered, 1);
        assert_eq!(rewrite.changed, 1);

        let og = format!("assets/images/og-{}.png", crate::asset::hash::content_hash(b"og bytes"));
        let html = fs::read_to_string(client.join("index.html")).unwrap();
        assert!(html.contains(&format!(r#"content="https://test.com/{og}""#)));
        assert!(html.contains(r#"src="/assets/images/logo-9f3ab21c.png""#));
        assert!(client.join(&og).is_file());

        // A second run changes nothing
        let again = run_hook(&config, &BuildPhase::default(), &logger, false).unwrap();
        let HookOutcome::Completed { rewrite, .. } = again else {
            panic!("expected a completed pass");
        };
        assert_eq!(rewrite.changed, 0);
    }

    #[test]
    fn test_uppercase_markup_is_recovered_and_rewritten() {
        let (_dir, config) = fixture();
        let src = &config.assets.src_dir;
        let client = config.assets.client_output_dir();

        let page = r#"<META PROPERTY="og:image" CONTENT="https://test.com/images/og.png"><IMG SRC="/images/hero.png">"#;
        write(src, "index.html", page);
        write(src, "images/og.png", "og bytes");
        write(src, "images/hero.png", "hero bytes");
        write(&client, "index.html", page);

        let logger = RecordingLogger::new();
        let outcome = run_hook(&config, &BuildPhase::default(), &logger, false).unwrap();
        let HookOutcome::Completed { recovered, rewrite, .. } = outcome else {
            panic!("expected a completed pass, got {outcome:?}");
        };
        assert_eq!(recovered, 2);
        assert_eq!(rewrite.changed, 1);

        let og = format!("assets/images/og-{}.png", crate::asset::hash::content_hash(b"og bytes"));
        let hero = format!("assets/images/hero-{}.png", crate::asset::hash::content_hash(b"hero bytes"));
        let html = fs::read_to_string(client.join("index.html")).unwrap();
        assert!(html.contains(&format!(r#"CONTENT="https://test.com/{og}""#)));
        assert!(html.contains(&format!(r#"SRC="/{hero}""#)));
    }
}
