//! `[hook]` section configuration.
//!
//! ```toml
//! [hook]
//! worker_env = "REHASH_WORKER_BUILD"   # Set by the host during the worker build
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

pub const DEFAULT_WORKER_ENV: &str = "REHASH_WORKER_BUILD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Environment variable that marks the worker phase of an SSR build.
    pub worker_env: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            worker_env: DEFAULT_WORKER_ENV.into(),
        }
    }
}

impl HookConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.worker_env.trim().is_empty() {
            diag.error(FieldPath::new("hook.worker_env"), "must not be empty");
        }
    }

    /// Whether the worker marker is set (non-empty) in the current environment.
    pub fn worker_marker_set(&self) -> bool {
        std::env::var_os(&self.worker_env).is_some_and(|v| !v.is_empty())
    }
}
