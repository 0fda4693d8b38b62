//! Tag scanner: extracts `<link>` / `<script>` asset references from markup.
//!
//! Matching is pattern based, not a DOM parse. Comments and `<noscript>`
//! fallbacks are blanked in a same-length copy before matching, so commented
//! tags are never picked up while every span still indexes the original text.
//!
//! # Skipped tags
//!
//! | Condition                               | Kind     |
//! |-----------------------------------------|----------|
//! | `data-optimized` present                | both     |
//! | `data-no-optimize` truthy               | both     |
//! | empty `href` / `src`                    | both     |
//! | `rel` other than `stylesheet`           | css      |
//! | `media` containing `print`              | css      |
//! | non-empty inline body                   | js       |
//!
//! A tag whose attributes cannot be parsed is skipped and logged.

mod attr;
mod mask;

pub use attr::{Attributes, parse_attributes};
pub use mask::mask_inert;

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

use crate::asset::{AssetKind, AssetReference, Position};
use crate::debug;

/// Marker attribute written on every tag this crate produced.
pub const OPTIMIZED_MARKER: &str = "data-optimized";
/// Opt-out attribute honored on any asset tag.
pub const NO_OPTIMIZE_MARKER: &str = "data-no-optimize";

/// Extracts asset references of one kind from a document.
///
/// Implementations must return references in document order, coalesce
/// identical raw tags, and never fail the whole scan because of one tag.
pub trait TagScanner {
    fn scan(&self, html: &str, kind: AssetKind) -> Vec<AssetReference>;
}

/// `<link ...>` tags (self-closing or not) plus the end of head.
static LINK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\s+([^>]+?)/?>|</head\s*>").unwrap());

/// External `<script src>` tags with an empty body plus the end of head.
static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\s+([^>]+)>\s*</script\s*>|</head\s*>").unwrap()
});

/// Default scanner built on regular expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexScanner;

impl TagScanner for RegexScanner {
    fn scan(&self, html: &str, kind: AssetKind) -> Vec<AssetReference> {
        let masked = mask_inert(html);
        let pattern = match kind {
            AssetKind::Css => &*LINK_TAG,
            AssetKind::Js => &*SCRIPT_TAG,
        };

        let mut refs: Vec<AssetReference> = Vec::new();
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        let mut position = Position::Head;

        for caps in pattern.captures_iter(&masked) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(inner) = caps.get(1) else {
                position = Position::Body;
                continue;
            };

            // Same text: masked regions never overlap a match
            let raw = &html[whole.range()];
            if let Some(&idx) = seen.get(raw) {
                refs[idx].spans.push(whole.range());
                continue;
            }

            let attrs = match parse_attributes(inner.as_str()) {
                Ok(attrs) => attrs,
                Err(e) => {
                    debug!("scan"; "{}", e);
                    continue;
                }
            };

            let Some(url) = accept(&attrs, kind) else {
                continue;
            };

            seen.insert(raw, refs.len());
            refs.push(AssetReference {
                url: url.to_string(),
                raw_tag: raw.to_string(),
                position,
                kind,
                attrs,
                spans: vec![whole.range()],
            });
        }

        debug!("scan"; "{} {} references", refs.len(), kind);
        refs
    }
}

/// Apply the per-kind skip rules; returns the referenced URL when accepted.
fn accept(attrs: &Attributes, kind: AssetKind) -> Option<&str> {
    if attrs.has(OPTIMIZED_MARKER) || attrs.is_truthy(NO_OPTIMIZE_MARKER) {
        return None;
    }

    if kind == AssetKind::Css {
        if !attrs
            .get("rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
        {
            return None;
        }
        if attrs.get("media").is_some_and(|m| m.contains("print")) {
            return None;
        }
    }

    attrs.get(kind.url_attr()).filter(|url| !url.is_empty())
}
