//! Link classifier: decides which scanned references get optimized.
//!
//! Checks run in a fixed order and the first hit wins:
//!
//! 1. `data-no-optimize` on the tag → [`ExcludeReason::ExplicitExclude`]
//! 2. URL hits a configured exclude pattern → [`ExcludeReason::ConfiguredExclude`]
//! 3. Remote URL or missing local file → [`ExcludeReason::External`]
//! 4. jQuery library with jQuery exclusion on → [`ExcludeReason::JqueryExcluded`]
//! 5. Otherwise eligible, sized from file metadata.

mod resolver;

pub use resolver::{FsResolver, LocalFile, LocalResolver};

use crate::asset::{AssetReference, ClassifiedReference, ExcludeReason};
use crate::debug;
use crate::scan::NO_OPTIMIZE_MARKER;

/// First pattern contained in `haystack`, ignoring empty patterns.
pub fn pattern_hit<'a>(haystack: &str, patterns: &'a [String]) -> Option<&'a str> {
    patterns
        .iter()
        .map(|p| p.trim())
        .find(|p| !p.is_empty() && haystack.contains(p))
}

/// Whether a URL points at the jQuery library file.
pub fn is_jquery(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.eq_ignore_ascii_case("jquery.js") || file.eq_ignore_ascii_case("jquery.min.js")
}

/// Classifies references of one asset kind.
pub struct LinkClassifier<'a> {
    resolver: &'a dyn LocalResolver,
    excludes: &'a [String],
    exclude_jquery: bool,
}

impl<'a> LinkClassifier<'a> {
    pub fn new(resolver: &'a dyn LocalResolver, excludes: &'a [String]) -> Self {
        Self {
            resolver,
            excludes,
            exclude_jquery: false,
        }
    }

    pub fn with_exclude_jquery(mut self, exclude_jquery: bool) -> Self {
        self.exclude_jquery = exclude_jquery;
        self
    }

    pub fn classify(&self, reference: AssetReference) -> ClassifiedReference {
        if reference.attrs.has(NO_OPTIMIZE_MARKER) {
            debug!("classify"; "{} excluded by attribute", reference.url);
            return ClassifiedReference::excluded(reference, ExcludeReason::ExplicitExclude);
        }

        if let Some(pattern) = pattern_hit(&reference.url, self.excludes) {
            debug!("classify"; "{} excluded by pattern `{}`", reference.url, pattern);
            return ClassifiedReference::excluded(reference, ExcludeReason::ConfiguredExclude);
        }

        let Some(file) = self.resolver.resolve_local(&reference.url) else {
            debug!("classify"; "{} external or missing", reference.url);
            return ClassifiedReference::excluded(reference, ExcludeReason::External);
        };

        if self.exclude_jquery && is_jquery(&reference.url) {
            debug!("classify"; "{} excluded as jQuery", reference.url);
            return ClassifiedReference::excluded(reference, ExcludeReason::JqueryExcluded);
        }

        ClassifiedReference::eligible(reference, file.size)
    }

    pub fn classify_all(&self, refs: Vec<AssetReference>) -> Vec<ClassifiedReference> {
        refs.into_iter().map(|r| self.classify(r)).collect()
    }
}
