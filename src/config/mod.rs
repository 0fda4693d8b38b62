//! Optimizer configuration management for `pageopt.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site] [css] [js] [html] [optimize]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # PageoptConfig (this file)
//! ```
//!
//! A loaded config is an immutable snapshot. Each page render borrows it;
//! nothing here is global.

pub mod section;
pub mod types;
mod util;

pub use section::{CssConfig, HtmlConfig, JsConfig, OptimizeConfig, SiteConfig};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::asset::AssetKind;
use crate::log;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pageopt.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageoptConfig {
    pub site: SiteConfig,
    pub css: CssConfig,
    pub js: JsConfig,
    pub html: HtmlConfig,
    pub optimize: OptimizeConfig,
}

impl PageoptConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load and validate configuration from a file, warning about unknown fields.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        // Relative document roots are relative to the config file
        if config.site.root.is_relative()
            && let Some(dir) = path.parent()
        {
            config.site.root = dir.join(&config.site.root);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    /// Validate every section. Warnings are printed, errors returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.site.validate(&mut diag);
        self.css.validate(&mut diag);
        self.js.validate(&mut diag);
        self.optimize.validate(&mut diag);
        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    // ------------------------------------------------------------------------
    // per-kind views
    // ------------------------------------------------------------------------

    pub fn minify(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Css => self.css.minify,
            AssetKind::Js => self.js.minify,
        }
    }

    pub fn excludes(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Css => &self.css.exclude,
            AssetKind::Js => &self.js.exclude,
        }
    }

    /// Push hints wanted for `kind` (enabled and not CDN-served).
    pub fn push(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Css => self.css.http2_push && !self.css.cdn,
            AssetKind::Js => self.js.http2_push && !self.js.cdn,
        }
    }

    /// Whether the static responder should serve generated files at all.
    pub fn serves_generated(&self) -> bool {
        self.css.minify || self.css.combine || self.js.minify || self.js.combine
    }

    /// Whether the CSS async loader script is referenced by pages.
    pub fn uses_async_loader(&self) -> bool {
        self.css.async_load || self.css.google_fonts_async
    }
}
