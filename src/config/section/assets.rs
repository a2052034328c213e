//! `[assets]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! src_dir = "src"                          # Source pages, manifest.json, media
//! output_dir = "dist"                      # Bundler output root
//! assets_subdir = "assets"                 # Hashed artifacts, under the client output
//! site_base_url = "https://example.com"    # Marks absolute references
//! client_subdir = "client"                 # Client build inside output_dir
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Field paths for diagnostics.
pub struct AssetConfigFields {
    pub src_dir: FieldPath,
    pub output_dir: FieldPath,
    pub assets_subdir: FieldPath,
    pub site_base_url: FieldPath,
    pub client_subdir: FieldPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Source root: HTML pages, `manifest.json`, referenced media.
    pub src_dir: PathBuf,

    /// Build output root.
    pub output_dir: PathBuf,

    /// Directory of hashed artifacts, relative to the client output.
    pub assets_subdir: String,

    /// Canonical site origin; references starting with it are absolute.
    pub site_base_url: String,

    /// Client build directory, relative to `output_dir`.
    pub client_subdir: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            assets_subdir: String::new(),
            site_base_url: String::new(),
            client_subdir: "client".into(),
        }
    }
}

impl AssetConfig {
    pub const FIELDS: AssetConfigFields = AssetConfigFields {
        src_dir: FieldPath::new("assets.src_dir"),
        output_dir: FieldPath::new("assets.output_dir"),
        assets_subdir: FieldPath::new("assets.assets_subdir"),
        site_base_url: FieldPath::new("assets.site_base_url"),
        client_subdir: FieldPath::new("assets.client_subdir"),
    };

    /// Root of the client build, the only tree the rewrite pass touches.
    pub fn client_output_dir(&self) -> PathBuf {
        self.output_dir.join(&self.client_subdir)
    }

    /// Validate assets configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let fields = &Self::FIELDS;

        if self.src_dir.as_os_str().is_empty() {
            diag.error(fields.src_dir, "required");
        }
        if self.output_dir.as_os_str().is_empty() {
            diag.error(fields.output_dir, "required");
        }

        if self.assets_subdir.is_empty() {
            diag.error(fields.assets_subdir, "required");
        } else if !is_plain_relative(Path::new(&self.assets_subdir)) {
            diag.error_with_hint(
                fields.assets_subdir,
                format!("'{}' must be a relative path without '..'", self.assets_subdir),
                "e.g. assets_subdir = \"assets\"",
            );
        }

        if !is_plain_relative(Path::new(&self.client_subdir)) {
            diag.error(
                fields.client_subdir,
                format!("'{}' must be a relative path without '..'", self.client_subdir),
            );
        }

        if self.site_base_url.is_empty() {
            diag.error(fields.site_base_url, "required");
        } else if !is_http_url(&self.site_base_url) {
            diag.error_with_hint(
                fields.site_base_url,
                format!("'{}' is not an absolute http(s) URL", self.site_base_url),
                "e.g. site_base_url = \"https://example.com\"",
            );
        }
    }
}

/// Relative, and never escapes upward.
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AssetConfig {
        AssetConfig {
            src_dir: "src".into(),
            output_dir: "dist".into(),
            assets_subdir: "assets".into(),
            site_base_url: "https://example.com".into(),
            client_subdir: "client".into(),
        }
    }

    fn errors(config: &AssetConfig) -> Vec<&'static str> {
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        diag.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid() {
        assert!(errors(&valid()).is_empty());
    }

    #[test]
    fn test_required_fields() {
        let config = AssetConfig::default();
        assert_eq!(
            errors(&config),
            vec![
                "assets.src_dir",
                "assets.output_dir",
                "assets.assets_subdir",
                "assets.site_base_url"
            ]
        );
    }

    #[test]
    fn test_site_base_url_must_be_http() {
        for bad in ["example.com", "ftp://example.com", "/relative"] {
            let config = AssetConfig {
                site_base_url: bad.into(),
                ..valid()
            };
            assert_eq!(errors(&config), vec!["assets.site_base_url"], "{bad}");
        }
    }

    #[test]
    fn test_assets_subdir_must_stay_inside() {
        for bad in ["../assets", "/abs/assets", "a/../../b"] {
            let config = AssetConfig {
                assets_subdir: bad.into(),
                ..valid()
            };
            assert_eq!(errors(&config), vec!["assets.assets_subdir"], "{bad}");
        }
        let nested = AssetConfig {
            assets_subdir: "static/assets".into(),
            ..valid()
        };
        assert!(errors(&nested).is_empty());
    }

    #[test]
    fn test_client_output_dir() {
        let config = AssetConfig {
            output_dir: "/site/dist".into(),
            ..valid()
        };
        assert_eq!(config.client_output_dir(), PathBuf::from("/site/dist/client"));
    }
}
