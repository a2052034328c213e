//! `[hash]` section configuration.
//!
//! ```toml
//! [hash]
//! min_length = 8   # Shortest tail after the last `-` that counts as a hash
//! ```

use serde::{Deserialize, Serialize};

use crate::asset::hash::{HASH_LEN, MAX_HASH_LEN};
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    /// Minimum hash suffix length recognized in bundler output names.
    pub min_length: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            min_length: HASH_LEN,
        }
    }
}

impl HashConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.min_length == 0 {
            diag.error_with_hint(
                FieldPath::new("hash.min_length"),
                "must be at least 1",
                format!("bundlers commonly emit {HASH_LEN} characters"),
            );
        } else if self.min_length > MAX_HASH_LEN {
            diag.error_with_hint(
                FieldPath::new("hash.min_length"),
                format!("must be at most {MAX_HASH_LEN}"),
                format!("bundlers commonly emit {HASH_LEN} characters"),
            );
        }
    }
}
