//! Document-level side pipelines that do not depend on asset processing.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use super::RenderContext;
use crate::asset::AssetKind;
use crate::debug;
use crate::synth::Splice;

/// Id of the inlined critical CSS block.
const CRITICAL_CSS_ID: &str = "pageopt-critical-css";

const GOOGLE_FONTS_PRECONNECT: &str =
    r#"<link rel="preconnect" href="https://fonts.gstatic.com/" crossorigin />"#;

/// Path of the CSS async loader under the generated-file prefix.
pub const ASYNC_LOADER: &str = "css_async.js";

/// Opening `<link>` / `<script>` tags.
static ASSET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:link|script)\b[^>]*>").unwrap());

/// `href` / `src` attribute and its value.
static URL_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\s(?:href|src)\s*=\s*["']?)([^"'\s>]+)"#).unwrap()
});

static VER_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ver=[\w.\-]+$").unwrap());

static INLINE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());

static INLINE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

const EMOJI_SCRIPT_MARKERS: [&str; 2] = ["_wpemojiSettings", "wp-emoji-release"];
const EMOJI_STYLE_MARKER: &str = "img.wp-smiley";

/// Drop `ver=` parameters from a URL, keeping the rest of the query.
pub fn strip_version(url: &str) -> Cow<'_, str> {
    let Some((base, rest)) = url.split_once('?') else {
        return Cow::Borrowed(url);
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (rest, None),
    };
    let params: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    let kept: Vec<&str> = params
        .iter()
        .copied()
        .filter(|p| !VER_PARAM.is_match(p))
        .collect();
    if kept.len() == params.len() {
        return Cow::Borrowed(url);
    }

    let mut out = base.to_string();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    Cow::Owned(out)
}

/// Strip `ver=` parameters from asset URLs of every `<link>` / `<script>`.
/// `None` when nothing changed.
pub fn remove_query_strings(html: &str) -> Option<String> {
    let mut splice = Splice::new();
    for tag in ASSET_TAG.find_iter(html) {
        let rewritten = URL_ATTR.replace_all(tag.as_str(), |attr: &Captures<'_>| {
            format!("{}{}", &attr[1], strip_version(&attr[2]))
        });
        if rewritten != tag.as_str() {
            splice.replace(&[tag.range()], &rewritten);
        }
    }
    (!splice.is_empty()).then(|| splice.apply(html))
}

/// Remove the emoji detection script and its inline style.
/// `None` when the page has neither.
pub fn remove_emoji(html: &str) -> Option<String> {
    let mut splice = Splice::new();
    for m in INLINE_SCRIPT.find_iter(html) {
        if EMOJI_SCRIPT_MARKERS.iter().any(|marker| m.as_str().contains(marker)) {
            splice.remove(&[m.range()]);
        }
    }
    for m in INLINE_STYLE.find_iter(html) {
        if m.as_str().contains(EMOJI_STYLE_MARKER) {
            splice.remove(&[m.range()]);
        }
    }
    (!splice.is_empty()).then(|| splice.apply(html))
}

pub fn dns_prefetch_tag(host: &str) -> String {
    format!("<link rel='dns-prefetch' href='{host}' />")
}

impl RenderContext<'_, '_> {
    /// Page edits and head items that precede the asset stages.
    pub(super) fn prepare_document(&mut self) {
        let config = self.config;

        if config.html.remove_emoji
            && let Some(html) = remove_emoji(self.doc.content())
        {
            debug!("optm"; "removed emoji script");
            self.doc.set_content(html);
        }

        if config.html.remove_query_strings
            && let Some(html) = remove_query_strings(self.doc.content())
        {
            self.doc.set_content(html);
        }

        if config.css.async_load
            && let Some(rules) = config.css.critical_rules.as_deref().map(str::trim)
            && !rules.is_empty()
            && !self.doc.content().contains(CRITICAL_CSS_ID)
        {
            self.doc
                .push_head(&format!(r#"<style id="{CRITICAL_CSS_ID}">{rules}</style>"#));
        }

        for host in config.html.dns_prefetch.iter().map(|h| h.trim()) {
            if !host.is_empty() {
                self.doc.push_head_once(&dns_prefetch_tag(host));
            }
        }
    }

    /// Head items that follow the asset stages: the CSS async loader and
    /// the Google Fonts preconnect.
    pub(super) fn queue_loaders(&mut self) {
        let config = self.config;
        if !config.uses_async_loader() {
            return;
        }

        let url = config
            .site
            .permalink(&format!("{}/{}", config.site.min_prefix(), ASYNC_LOADER));
        if !self.doc.content().contains(&url) {
            let defer = if config.js.defer { " defer" } else { "" };
            self.doc
                .push_head(&format!("<script src='{url}'{defer}></script>"));
        }
        self.push(&url, AssetKind::Js);

        if config.css.google_fonts_async {
            self.doc.push_head_once(GOOGLE_FONTS_PRECONNECT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("/a.css?ver=5.2.1"), "/a.css");
        assert_eq!(strip_version("/a.css?ver=1&b=2"), "/a.css?b=2");
        assert_eq!(strip_version("/a.css?b=2&ver=1-beta#x"), "/a.css?b=2#x");
        assert_eq!(strip_version("/a.css?version=3"), "/a.css?version=3");
        assert!(matches!(strip_version("/a.css"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_remove_query_strings_only_on_asset_tags() {
        let html = r#"<link rel="stylesheet" href="/a.css?ver=1"><a href="/p?ver=1">x</a><script src='/b.js?ver=2'></script>"#;
        assert_eq!(
            remove_query_strings(html).unwrap(),
            r#"<link rel="stylesheet" href="/a.css"><a href="/p?ver=1">x</a><script src='/b.js'></script>"#
        );
        assert!(remove_query_strings(r#"<script src="/b.js"></script>"#).is_none());
    }

    #[test]
    fn test_remove_emoji() {
        let html = concat!(
            "<head><script>window._wpemojiSettings = {};</script>",
            "<script>var keep = 1;</script>",
            "<style>img.wp-smiley, img.emoji { display: inline; }</style>",
            "<style>body{}</style></head>"
        );
        assert_eq!(
            remove_emoji(html).unwrap(),
            "<head><script>var keep = 1;</script><style>body{}</style></head>"
        );
        assert!(remove_emoji("<script>var keep = 1;</script>").is_none());
    }
}
