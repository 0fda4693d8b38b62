//! Page optimization pipeline.
//!
//! One [`Pipeline`] holds the collaborators (config, store, resolver,
//! minifier, scanner, hooks). Each call to [`Pipeline::optimize`] builds a
//! fresh per-request context that owns the [`DocumentBuffer`] and walks the
//! stages:
//!
//! ```text
//! Idle ─▶ ScanningCss ─▶ ProcessingCss ─▶ ScanningJs ─▶ ProcessingJs
//!      ─▶ InjectingHeadFoot ─▶ MinifyingWhole ─▶ Done
//! ```
//!
//! A stage is entered only when its configuration flags are on. Document
//! side-pipelines (emoji removal, query-string stripping, DNS prefetch)
//! run before the asset stages and do not depend on them.
//!
//! Nothing here fails a request: every error degrades to leaving the
//! affected markup as it was.

mod css;
mod document;
mod hooks;
mod js;

pub use document::ASYNC_LOADER;
pub use hooks::{Hooks, Injection};

use std::fmt;

use crate::asset::{AssetKind, AssetReference, ClassifiedReference, ExcludeReason};
use crate::classify::{LinkClassifier, LocalResolver, pattern_hit};
use crate::config::PageoptConfig;
use crate::error::PipelineError;
use crate::minify::{Minifier, MinifyError, MinifyKind};
use crate::registry::{HashRegistry, HashStore};
use crate::scan::{RegexScanner, TagScanner};
use crate::synth::{DocumentBuffer, Splice, async_css, mark_optimized, rewrite_url};
use crate::{debug, log};

/// Comment appended to pages after whole-document minification.
pub const BANNER: &str = "<!-- Page optimized by pageopt -->";

// =============================================================================
// Types
// =============================================================================

/// Pipeline states, in the order they can be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ScanningCss,
    ProcessingCss,
    ScanningJs,
    ProcessingJs,
    InjectingHeadFoot,
    MinifyingWhole,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::ScanningCss => "scanning css",
            Self::ProcessingCss => "processing css",
            Self::ScanningJs => "scanning js",
            Self::ProcessingJs => "processing js",
            Self::InjectingHeadFoot => "injecting head/foot",
            Self::MinifyingWhole => "minifying html",
            Self::Done => "done",
        })
    }
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    /// Transformed page.
    pub html: String,
    /// `<uri>; rel=preload; as=...` values in first-seen order.
    pub push_hints: Vec<String>,
    /// Stages entered, in order.
    pub stages: Vec<Stage>,
}

impl Optimized {
    fn untouched(html: String) -> Self {
        Self {
            html,
            push_hints: Vec::new(),
            stages: vec![Stage::Idle, Stage::Done],
        }
    }

    /// Value for a `Link` response header, if any hint was collected.
    pub fn link_header(&self) -> Option<String> {
        (!self.push_hints.is_empty()).then(|| self.push_hints.join(","))
    }

    pub fn entered(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Collaborators shared by every optimization run.
pub struct Pipeline<'a> {
    config: &'a PageoptConfig,
    store: &'a dyn HashStore,
    resolver: &'a dyn LocalResolver,
    minifier: &'a dyn Minifier,
    scanner: &'a dyn TagScanner,
    hooks: Hooks,
}

impl<'a> Pipeline<'a> {
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
            scanner: &RegexScanner,
            hooks: Hooks::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: &'a dyn TagScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &PageoptConfig {
        self.config
    }

    /// Optimize the response for `uri`, or pass it through unchanged when
    /// the URI hits `site.exclude_uris`.
    pub fn optimize_request(&self, html: String, uri: &str) -> Optimized {
        if let Some(pattern) = pattern_hit(uri, &self.config.site.exclude_uris) {
            debug!("optm"; "{} excluded by `{}`", uri, pattern);
            return Optimized::untouched(html);
        }
        self.optimize(html)
    }

    /// Run every enabled stage over a full HTML page.
    pub fn optimize(&self, html: String) -> Optimized {
        RenderContext::new(self, html).run()
    }
}

// =============================================================================
// Per-request context
// =============================================================================

/// State of one run: the document buffer and the stages entered so far.
struct RenderContext<'p, 'a> {
    pipeline: &'p Pipeline<'a>,
    config: &'a PageoptConfig,
    registry: HashRegistry<'a>,
    doc: DocumentBuffer,
    stages: Vec<Stage>,
}

impl<'p, 'a> RenderContext<'p, 'a> {
    fn new(pipeline: &'p Pipeline<'a>, html: String) -> Self {
        let config = pipeline.config;
        Self {
            pipeline,
            config,
            registry: HashRegistry::new(pipeline.store, config.site.min_base_url()),
            doc: DocumentBuffer::new(html),
            stages: Vec::new(),
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!("optm"; "{}", stage);
        self.stages.push(stage);
    }

    fn run(mut self) -> Optimized {
        let config = self.config;
        self.enter(Stage::Idle);
        self.prepare_document();

        if config.css.needs_scan() {
            self.enter(Stage::ScanningCss);
            let refs = self.scan(AssetKind::Css);
            self.enter(Stage::ProcessingCss);
            self.process_css(refs);
        }

        if config.js.needs_scan() {
            self.enter(Stage::ScanningJs);
            let refs = self.scan(AssetKind::Js);
            self.enter(Stage::ProcessingJs);
            self.process_js(refs);
        }

        self.queue_loaders();
        if self.doc.has_injections() {
            self.enter(Stage::InjectingHeadFoot);
            self.inject();
        }

        if config.html.minify {
            self.enter(Stage::MinifyingWhole);
            self.minify_whole();
        }

        self.enter(Stage::Done);
        let (html, push_hints) = self.doc.finish();
        Optimized {
            html,
            push_hints,
            stages: self.stages,
        }
    }

    fn scan(&mut self, kind: AssetKind) -> Vec<AssetReference> {
        self.pipeline.hooks.run_pre_scan(self.doc.content_mut(), kind);
        self.pipeline.scanner.scan(self.doc.content(), kind)
    }

    fn classify(&self, refs: Vec<AssetReference>, kind: AssetKind) -> Vec<ClassifiedReference> {
        let exclude_jquery = kind == AssetKind::Js && self.config.js.exclude_jquery;
        let classifier = LinkClassifier::new(self.pipeline.resolver, self.config.excludes(kind))
            .with_exclude_jquery(exclude_jquery);
        let mut classified = classifier.classify_all(refs);
        self.pipeline.hooks.run_post_classify(&mut classified);
        classified
    }

    /// Hashed URL for a source list, or `None` when the store fails.
    fn resolve(&self, sources: &[String], kind: AssetKind) -> Option<String> {
        match self.registry.resolve(sources, kind) {
            Ok(url) => Some(url),
            Err(source) => {
                let reason = source.to_string();
                log!("optm"; "{}: {}", PipelineError::Store { kind, source }, reason);
                None
            }
        }
    }

    fn push(&mut self, url: &str, kind: AssetKind) {
        if self.config.push(kind) {
            self.doc.hints_mut().add(url, kind);
        }
    }

    /// Push-hint internal references that stay out of optimization.
    fn push_kept_internal(&mut self, refs: &[ClassifiedReference], kind: AssetKind) {
        for c in refs {
            if c.reason == Some(ExcludeReason::JqueryExcluded) {
                self.push(c.url(), kind);
            }
        }
    }

    /// Rewrite references where they stand: hashed URL for eligible ones when
    /// minifying, then the kind's loading decoration for everything not pinned.
    fn rewrite_in_place(
        &mut self,
        refs: &[ClassifiedReference],
        kind: AssetKind,
        splice: &mut Splice,
    ) {
        let minify = self.config.minify(kind);
        for c in refs.iter().filter(|c| !c.is_pinned()) {
            let mut tag = c.raw_tag().to_string();
            if c.eligible {
                if !minify {
                    self.push(c.url(), kind);
                } else if let Some(url) = self.resolve(&[c.url().to_string()], kind) {
                    tag = rewrite_url(&tag, kind, c.url(), &url);
                    tag = mark_optimized(&tag, kind);
                    self.push(&url, kind);
                }
            }
            let tag = self.decorate(tag, c);
            if tag != c.raw_tag() {
                splice.replace(&c.reference.spans, &tag);
            }
        }
    }

    /// Loading decoration for a tag that is kept: async CSS or deferred JS.
    fn decorate(&self, tag: String, c: &ClassifiedReference) -> String {
        match c.reference.kind {
            AssetKind::Css if self.wants_async(c) => {
                async_css(&tag, &c.reference.attrs).unwrap_or(tag)
            }
            AssetKind::Js if self.config.js.defer => self
                .defer_rules()
                .apply(&tag, &c.reference.attrs, c.url())
                .unwrap_or(tag),
            _ => tag,
        }
    }

    fn inject(&mut self) {
        let hooks = &self.pipeline.hooks;
        hooks.run_pre_splice(Injection::Head, self.doc.head_mut());
        hooks.run_pre_splice(Injection::Foot, self.doc.foot_mut());
        self.doc.inject();
    }

    /// Minify the whole page, restoring it on failure.
    fn minify_whole(&mut self) {
        let original = self.doc.content();
        let result = self
            .pipeline
            .minifier
            .minify(original, MinifyKind::Html)
            .and_then(|minified| {
                if minified.trim().is_empty() && !original.trim().is_empty() {
                    Err(MinifyError::Empty(MinifyKind::Html))
                } else {
                    Ok(minified)
                }
            });

        match result {
            Ok(mut minified) => {
                if !minified.contains(BANNER) {
                    minified.push('\n');
                    minified.push_str(BANNER);
                }
                self.doc.set_content(minified);
            }
            Err(e) => {
                let reason = e.to_string();
                log!("optm"; "{}: {}", PipelineError::MinifyFailure(e), reason);
            }
        }
    }
}
