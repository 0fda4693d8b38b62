//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://example.com"
//! root = "/var/www/html"
//! min_path = "/min"
//! exclude_uris = ["/checkout", "/cart"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Home URL. Hashed URLs are absolute under it and references on its
    /// host are internal. Without it, generated URLs are root-relative.
    pub url: Option<String>,

    /// Document root that internal URL paths map onto.
    pub root: PathBuf,

    /// Path prefix of generated files.
    pub min_path: String,

    /// Request URIs containing any of these are served unoptimized.
    pub exclude_uris: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: None,
            root: PathBuf::from("."),
            min_path: "/min".into(),
            exclude_uris: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub const URL: FieldPath = FieldPath::new("site.url");
    pub const MIN_PATH: FieldPath = FieldPath::new("site.min_path");

    /// Parsed home URL, if configured and valid.
    pub fn home(&self) -> Option<Url> {
        self.url.as_deref().and_then(|u| Url::parse(u).ok())
    }

    /// Normalized generated-file prefix: leading slash, no trailing slash.
    pub fn min_prefix(&self) -> String {
        format!("/{}", self.min_path.trim_matches('/'))
    }

    /// URL prefix of generated files (absolute when `url` is set).
    pub fn min_base_url(&self) -> String {
        match &self.url {
            Some(url) => format!("{}{}", url.trim_end_matches('/'), self.min_prefix()),
            None => self.min_prefix(),
        }
    }

    /// Absolute URL of a site path (root-relative without `url`).
    pub fn permalink(&self, path: &str) -> String {
        let path = format!("/{}", path.trim_start_matches('/'));
        match &self.url {
            Some(url) => format!("{}{}", url.trim_end_matches('/'), path),
            None => path,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Some(url) = &self.url {
            match Url::parse(url) {
                Ok(parsed) if parsed.has_host() => {}
                _ => diag.error_with_hint(
                    Self::URL,
                    format!("`{url}` is not an absolute URL"),
                    "use the full home URL, e.g. \"https://example.com\"",
                ),
            }
        }
        if self.min_path.trim_matches('/').is_empty() {
            diag.error(Self::MIN_PATH, "must not be empty or `/`");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_base_url() {
        let mut site = SiteConfig::default();
        assert_eq!(site.min_base_url(), "/min");

        site.url = Some("https://example.com/".into());
        site.min_path = "assets/min/".into();
        assert_eq!(site.min_base_url(), "https://example.com/assets/min");
        assert_eq!(site.permalink("min/css_async.js"), "https://example.com/min/css_async.js");
    }

    #[test]
    fn test_validate_url() {
        let mut diag = ConfigDiagnostics::new();
        let site = SiteConfig {
            url: Some("example.com".into()),
            ..SiteConfig::default()
        };
        site.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
