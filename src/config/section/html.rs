//! `[html]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [html]
//! minify = true
//! remove_query_strings = true
//! remove_emoji = true
//! dns_prefetch = ["//fonts.googleapis.com", "//www.google-analytics.com"]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Minify the final document (restored on failure).
    pub minify: bool,
    /// Strip `ver=` query parameters from asset URLs.
    pub remove_query_strings: bool,
    /// Remove the inline emoji detection script and style.
    pub remove_emoji: bool,
    /// Hosts announced with `<link rel='dns-prefetch'>`.
    pub dns_prefetch: Vec<String>,
}
