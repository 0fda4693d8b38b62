//! Static responder for generated files.
//!
//! Answers `<min_path>/<name>.(css|js)` by loading the source list the hash
//! registry stored under `<name>.<ext>`, reading every local source, and
//! concatenating them (minified when the kind's `minify` flag is on).
//! Also serves the embedded CSS async loader.
//!
//! Caching decisions are reported to a [`CacheControl`] sink owned by the
//! embedding server.

mod rebase;

pub use rebase::rebase_urls;

use std::fs;

use crate::asset::AssetKind;
use crate::classify::LocalResolver;
use crate::config::PageoptConfig;
use crate::embed::serve::{CSS_ASYNC_JS, CSS_ASYNC_TTL};
use crate::error::PipelineError;
use crate::minify::{Minifier, MinifyError};
use crate::pipeline::ASYNC_LOADER;
use crate::registry::HashStore;
use crate::{debug, log};

/// Cache tag of generated files.
pub const TAG_MIN: &str = "MIN";
/// Cache tag of the CSS async loader.
pub const TAG_MIN_CSS_ASYNC: &str = "MIN_CSS_ASYNC";

/// Cache instructions for the response being built.
pub trait CacheControl {
    fn set_cacheable(&mut self);
    fn set_ttl(&mut self, seconds: u64);
    fn add_tag(&mut self, tag: &str);
    fn set_nocache(&mut self, reason: &str);
}

/// Recorded cache instructions, for servers that apply them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub cacheable: bool,
    pub ttl: Option<u64>,
    pub tags: Vec<String>,
    /// Reason the response must not be cached.
    pub nocache: Option<String>,
}

impl CacheControl for CachePolicy {
    fn set_cacheable(&mut self) {
        self.cacheable = true;
    }

    fn set_ttl(&mut self, seconds: u64) {
        self.ttl = Some(seconds);
    }

    fn add_tag(&mut self, tag: &str) {
        self.tags.push(tag.to_string());
    }

    fn set_nocache(&mut self, reason: &str) {
        self.cacheable = false;
        self.nocache = Some(reason.to_string());
    }
}

/// Body and content type of a served file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub content_type: &'static str,
    pub body: String,
}

impl AssetResponse {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Serves generated files for one configuration.
pub struct AssetResponder<'a> {
    config: &'a PageoptConfig,
    store: &'a dyn HashStore,
    resolver: &'a dyn LocalResolver,
    minifier: &'a dyn Minifier,
}

impl<'a> AssetResponder<'a> {
    pub fn new(
        config: &'a PageoptConfig,
        store: &'a dyn HashStore,
        resolver: &'a dyn LocalResolver,
        minifier: &'a dyn Minifier,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
            minifier,
        }
    }

    /// Respond to `uri`, or `None` when it is not a generated file.
    ///
    /// A generated-file URI with no stored sources, or whose sources are all
    /// unreadable, yields an empty body marked uncacheable.
    pub fn respond(&self, uri: &str, cache: &mut dyn CacheControl) -> Option<AssetResponse> {
        let prefix = format!("{}/", self.config.site.min_prefix());
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        let file = path.find(&prefix).map(|at| &path[at + prefix.len()..])?;

        if file == ASYNC_LOADER {
            if !self.config.uses_async_loader() {
                return None;
            }
            cache.set_cacheable();
            cache.set_ttl(CSS_ASYNC_TTL);
            cache.add_tag(TAG_MIN_CSS_ASYNC);
            return Some(AssetResponse {
                content_type: "application/x-javascript; charset=utf-8",
                body: CSS_ASYNC_JS.to_string(),
            });
        }

        if !self.config.serves_generated() {
            return None;
        }
        let kind = generated_kind(file)?;
        debug!("serve"; "{}", file);

        let body = self.build(file, kind);
        if body.is_empty() {
            cache.set_nocache("empty content from optimizer");
        } else {
            cache.set_cacheable();
            cache.set_ttl(self.config.optimize.ttl);
            cache.add_tag(TAG_MIN);
        }
        Some(AssetResponse {
            content_type: kind.content_type(),
            body,
        })
    }

    /// Concatenated (and possibly minified) content of a generated file.
    pub fn build(&self, file: &str, kind: AssetKind) -> String {
        let sources = match self.store.get(file) {
            Ok(Some(sources)) => sources,
            Ok(None) => {
                debug!("serve"; "no sources stored for {}", file);
                return String::new();
            }
            Err(source) => {
                let reason = source.to_string();
                log!("serve"; "{}: {}", PipelineError::Store { kind, source }, reason);
                return String::new();
            }
        };

        let separator = match kind {
            AssetKind::Css => "\n",
            AssetKind::Js => ";\n",
        };
        let parts: Vec<String> = sources
            .iter()
            .filter_map(|url| self.load(url, kind))
            .filter(|part| !part.trim().is_empty())
            .collect();
        parts.join(separator)
    }

    /// One source, rebased and minified as configured.
    fn load(&self, url: &str, kind: AssetKind) -> Option<String> {
        let Some(file) = self.resolver.resolve_local(url) else {
            log!("serve"; "{}", PipelineError::ExternalOrMissing { url: url.to_string() });
            return None;
        };
        let source = match fs::read_to_string(&file.path) {
            Ok(source) => source,
            Err(e) => {
                log!("serve"; "{}", PipelineError::Io(file.path, e));
                return None;
            }
        };

        let source = match kind {
            AssetKind::Css => rebase_urls(&source, url).into_owned(),
            AssetKind::Js => source,
        };

        let already_minified = file
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(".min"));
        if !self.config.minify(kind) || already_minified {
            return Some(source);
        }
        let result = self.minifier.minify(&source, kind.into()).and_then(|minified| {
            if minified.trim().is_empty() && !source.trim().is_empty() {
                Err(MinifyError::Empty(kind.into()))
            } else {
                Ok(minified)
            }
        });
        match result {
            Ok(minified) => Some(minified),
            Err(e) => {
                debug!("serve"; "{} left unminified: {}", url, e);
                Some(source)
            }
        }
    }
}

/// Kind of a generated file name `<word>.(css|js)`.
fn generated_kind(file: &str) -> Option<AssetKind> {
    let (stem, ext) = file.split_once('.')?;
    let valid_stem =
        !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_stem {
        return None;
    }
    AssetKind::from_ext(ext)
}
