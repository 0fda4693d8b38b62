//! `[optimize]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [optimize]
//! max_combined_bytes = 1000000
//! ttl = 604800
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Size ceiling of one combined file, in bytes.
    pub max_combined_bytes: u64,
    /// Cache lifetime of generated files, in seconds.
    pub ttl: u64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_combined_bytes: 1_000_000,
            ttl: 604_800,
        }
    }
}

impl OptimizeConfig {
    pub const MAX_COMBINED_BYTES: FieldPath = FieldPath::new("optimize.max_combined_bytes");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.max_combined_bytes == 0 {
            diag.error_with_hint(
                Self::MAX_COMBINED_BYTES,
                "must be greater than 0",
                "1000000 (1 MB) is a reasonable ceiling",
            );
        }
    }
}
