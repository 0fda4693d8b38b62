//! `[css]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [css]
//! minify = true
//! combine = true
//! http2_push = true
//! async_load = true
//! combined_first = true
//! exclude = ["/wp-content/plugins/slider/"]
//! critical_rules = "body{margin:0}"
//! google_fonts_async = true
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Minify each stylesheet into its own generated file.
    pub minify: bool,
    /// Combine stylesheets into size-bounded generated files.
    pub combine: bool,
    /// Emit preload push hints for stylesheets.
    pub http2_push: bool,
    /// Load stylesheets through preload-and-swap.
    pub async_load: bool,
    /// Place combined files before the ignored (kept) tags.
    pub combined_first: bool,
    /// URL substrings excluded from optimization.
    pub exclude: Vec<String>,
    /// Critical rules inlined in the head when `async_load` is on.
    pub critical_rules: Option<String>,
    /// Async-load Google Fonts stylesheets only.
    pub google_fonts_async: bool,
    /// Drop Google Fonts stylesheets from the page.
    pub google_fonts_remove: bool,
    /// Stylesheets are served by a CDN; no push hints.
    pub cdn: bool,
}

impl CssConfig {
    pub const EXCLUDE: FieldPath = FieldPath::new("css.exclude");

    /// Whether the CSS scan runs at all.
    pub fn needs_scan(&self) -> bool {
        self.minify
            || self.combine
            || self.http2_push
            || self.async_load
            || self.google_fonts_async
            || self.google_fonts_remove
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.exclude.iter().any(|p| !p.is_empty() && p.trim().is_empty()) {
            diag.warn(Self::EXCLUDE, "whitespace-only patterns are ignored");
        }
    }
}
