//! `[js]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [js]
//! minify = true
//! combine = true
//! defer = true
//! defer_exclude = ["recaptcha"]
//! exclude_jquery = true
//! combined_first = true
//! ```

use serde::{Deserialize, Serialize};

use crate::classify::pattern_hit;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    /// Minify each script into its own generated file.
    pub minify: bool,
    /// Combine scripts into size-bounded generated files (head and foot).
    pub combine: bool,
    /// Emit preload push hints for scripts.
    pub http2_push: bool,
    /// Add `defer` to external scripts.
    pub defer: bool,
    /// URL substrings never deferred.
    pub defer_exclude: Vec<String>,
    /// Place combined files before the ignored (kept) tags; hoist jQuery.
    pub combined_first: bool,
    /// URL substrings excluded from optimization.
    pub exclude: Vec<String>,
    /// Keep the jQuery library out of minify/combine/defer.
    pub exclude_jquery: bool,
    /// Scripts are served by a CDN; no push hints.
    pub cdn: bool,
}

/// jQuery URLs the exclude list is checked against for overlap.
const JQUERY_PROBES: [&str; 2] = ["/jquery.js", "/jquery.min.js"];

impl JsConfig {
    pub const EXCLUDE: FieldPath = FieldPath::new("js.exclude");

    pub fn needs_scan(&self) -> bool {
        self.minify || self.combine || self.http2_push || self.defer
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.exclude_jquery {
            return;
        }
        // Exclude patterns take precedence; flag the overlap once.
        if let Some(pattern) = JQUERY_PROBES
            .iter()
            .find_map(|probe| pattern_hit(probe, &self.exclude))
        {
            diag.warn(
                Self::EXCLUDE,
                format!("pattern `{pattern}` also matches jQuery and excludes it"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jquery_overlap_warning() {
        let js = JsConfig {
            exclude_jquery: true,
            exclude: vec!["jquery".into()],
            ..JsConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        js.validate(&mut diag);
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().len(), 1);
    }

    #[test]
    fn test_no_warning_without_overlap() {
        let js = JsConfig {
            exclude_jquery: true,
            exclude: vec!["analytics".into()],
            ..JsConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        js.validate(&mut diag);
        assert!(diag.warnings().is_empty());
    }
}
