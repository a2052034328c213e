//! Configuration management for `rehash.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [assets]
//! │   ├── hash       # [hash]
//! │   └── hook       # [hook]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # RehashConfig (this file)
//! ```
//!
//! # Loading
//!
//! 1. `rehash.toml` is found by searching upward from the working directory
//! 2. Unknown keys are reported as warnings
//! 3. `--src`, `--output`, `--site-url` override the file
//! 4. Every section is validated, errors are reported together
//! 5. Paths are resolved against the config file's directory

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{AssetConfig, HashConfig, HookConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::Cli;
use crate::logger::Logger;
use crate::utils::path::normalize_path;
use crate::{debug, warn};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Sections as written in the file. `[assets]` has no usable default.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    assets: Option<AssetConfig>,
    #[serde(default)]
    hash: HashConfig,
    #[serde(default)]
    hook: HookConfig,
}

/// Root configuration structure representing rehash.toml
#[derive(Debug, Clone, Default, Serialize)]
pub struct RehashConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source/output trees and site base URL
    pub assets: AssetConfig,

    /// Hash suffix recognition
    pub hash: HashConfig,

    /// Build-phase detection
    pub hook: HookConfig,
}

impl RehashConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory.
    pub fn load(cli: &Cli, logger: &dyn Logger) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path, logger)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = normalize_path(&config_path);

        config.apply_cli_options(cli);
        config.validate()?;
        config.normalize_paths(&root);
        debug!(logger, "config"; "loaded {} (root {})", config.config_path.display(), config.root.display());
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(Self::from_file(file)?)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        Ok(Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            assets: file.assets.ok_or(ConfigError::Missing("assets"))?,
            hash: file.hash,
            hook: file.hook,
        })
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path, logger: &dyn Logger) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (file, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            for field in &ignored {
                warn!(logger, "config"; "unknown field `{}` in {}, ignoring", field, display_path);
            }
        }

        Ok(Self::from_file(file)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(ConfigFile, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let file = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((file, ignored))
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply `--src`, `--output` and `--site-url`.
    fn apply_cli_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.assets.src_dir, cli.src.as_ref());
        Self::update_option(&mut self.assets.output_dir, cli.output.as_ref());
        Self::update_option(&mut self.assets.site_base_url, cli.site_url.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve directories against `root` and canonicalize the base URL.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.assets.src_dir = normalize_path(&root.join(&self.assets.src_dir));
        self.assets.output_dir = normalize_path(&root.join(&self.assets.output_dir));
        self.assets.site_base_url = self.assets.site_base_url.trim_end_matches('/').to_string();
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all errors at once.
    ///
    /// Runs before path normalization so that empty paths are still visible.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.assets.validate(&mut diag);
        self.hash.validate(&mut diag);
        self.hook.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config with a valid `[assets]` section prepended.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> RehashConfig {
    let config = format!(
        "[assets]\nsrc_dir = \"src\"\noutput_dir = \"dist\"\nassets_subdir = \"assets\"\nsite_base_url = \"https://example.com\"\n{extra}"
    );
    let (file, ignored) = RehashConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    RehashConfig::from_file(file).unwrap()
}

// ============================================================================
// tests
// ============================================================================
