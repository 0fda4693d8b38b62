//! Builders and rewrites for asset tags.

use regex::Regex;
use std::sync::LazyLock;

use crate::asset::AssetKind;
use crate::classify::{is_jquery, pattern_hit};
use crate::scan::{Attributes, OPTIMIZED_MARKER};

/// Value of the optimized marker on combined stylesheets.
const COMBINED_CSS: &str = "2";
/// Value of the optimized marker on everything else.
const OPTIMIZED: &str = "1";

static REL_STYLESHEET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(\brel\s*=\s*["']?)stylesheet"#).unwrap());

/// `<link>` for a combined stylesheet.
pub fn combined_css(url: &str) -> String {
    format!("<link {OPTIMIZED_MARKER}='{COMBINED_CSS}' rel='stylesheet' href='{url}' />")
}

/// Preloading `<link>` for a combined stylesheet, with a noscript fallback.
pub fn combined_css_async(url: &str) -> String {
    format!(
        "<link rel='preload' data-asynced='1' {OPTIMIZED_MARKER}='{COMBINED_CSS}' as='style' \
         onload='this.rel=\"stylesheet\"' href='{url}' /><noscript>{}</noscript>",
        combined_css(url)
    )
}

/// `<script>` for a combined or minified script.
pub fn combined_js(url: &str, defer: bool) -> String {
    let defer = if defer { " defer" } else { "" };
    format!("<script {OPTIMIZED_MARKER}='{OPTIMIZED}' src='{url}'{defer}></script>")
}

/// Byte offset right after the opening `<tag` name.
fn after_tag_name(tag: &str, kind: AssetKind) -> Option<usize> {
    let name = kind.tag_name();
    let head = tag.get(..name.len() + 1)?;
    (head.starts_with('<') && head[1..].eq_ignore_ascii_case(name)).then_some(name.len() + 1)
}

/// Insert attribute text right after the tag name.
fn insert_after_name(tag: &str, kind: AssetKind, attrs: &str) -> Option<String> {
    let at = after_tag_name(tag, kind)?;
    Some(format!("{} {}{}", &tag[..at], attrs, &tag[at..]))
}

/// Mark a rewritten tag as optimized so later scans skip it.
pub fn mark_optimized(tag: &str, kind: AssetKind) -> String {
    insert_after_name(tag, kind, &format!("{OPTIMIZED_MARKER}='{OPTIMIZED}'"))
        .unwrap_or_else(|| tag.to_string())
}

/// Replace the referenced URL inside a tag, keeping every other attribute.
pub fn rewrite_url(tag: &str, kind: AssetKind, from: &str, to: &str) -> String {
    let pattern = format!(
        r#"(?i)(\s{}\s*=\s*["']?){}"#,
        kind.url_attr(),
        regex::escape(from)
    );
    match Regex::new(&pattern) {
        Ok(re) if re.is_match(tag) => {
            let replacement = format!("${{1}}{}", to.replace('$', "$$"));
            re.replace(tag, replacement.as_str()).into_owned()
        }
        _ => tag.replacen(from, to, 1),
    }
}

/// Rewrite a stylesheet tag to preload-and-swap, keeping the original in
/// a `<noscript>` fallback. `None` when the tag opts out or is already async.
pub fn async_css(tag: &str, attrs: &Attributes) -> Option<String> {
    if attrs.has("data-asynced") || attrs.has("data-no-async") {
        return None;
    }
    let preload = REL_STYLESHEET.replace(tag, "${1}preload");
    let wrapped = insert_after_name(
        &preload,
        AssetKind::Css,
        "data-asynced='1' as='style' onload='this.rel=\"stylesheet\"'",
    )?;
    Some(format!("{wrapped}<noscript>{tag}</noscript>"))
}

/// When a script may receive `defer`.
#[derive(Debug, Clone, Copy)]
pub struct DeferRules<'a> {
    pub exclude: &'a [String],
    pub exclude_jquery: bool,
}

impl DeferRules<'_> {
    /// Add `defer` and the deferred marker. `None` when the script already
    /// loads async/deferred, opts out, or is excluded.
    pub fn apply(&self, tag: &str, attrs: &Attributes, url: &str) -> Option<String> {
        if ["async", "defer", "data-deferred", "data-no-defer"]
            .iter()
            .any(|a| attrs.has(a))
        {
            return None;
        }
        if pattern_hit(url, self.exclude).is_some() {
            return None;
        }
        if self.exclude_jquery && is_jquery(url) {
            return None;
        }
        let close = tag.find('>')?;
        Some(format!(
            "{} defer data-deferred='1'{}",
            &tag[..close],
            &tag[close..]
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::parse_attributes;

    fn attrs_of(tag: &str) -> Attributes {
        let inner = tag
            .trim_start_matches(|c: char| c != ' ')
            .split('>')
            .next()
            .unwrap();
        parse_attributes(inner).unwrap()
    }

    #[test]
    fn test_combined_tags() {
        assert_eq!(
            combined_css("/min/abcde.css"),
            "<link data-optimized='2' rel='stylesheet' href='/min/abcde.css' />"
        );
        assert_eq!(
            combined_js("/min/abcde.js", true),
            "<script data-optimized='1' src='/min/abcde.js' defer></script>"
        );
        assert!(combined_css_async("/m.css").contains("<noscript><link data-optimized='2'"));
    }

    #[test]
    fn test_rewrite_and_mark() {
        let tag = r#"<script id="app" src="/js/app.js?ver=2"></script>"#;
        let out = rewrite_url(tag, AssetKind::Js, "/js/app.js?ver=2", "https://x.com/min/a1b2c.js");
        let out = mark_optimized(&out, AssetKind::Js);
        assert_eq!(
            out,
            r#"<script data-optimized='1' id="app" src="https://x.com/min/a1b2c.js"></script>"#
        );
    }

    #[test]
    fn test_rewrite_only_url_attribute() {
        let tag = r#"<link title="/a.css" rel="stylesheet" href="/a.css">"#;
        let out = rewrite_url(tag, AssetKind::Css, "/a.css", "/min/x.css");
        assert_eq!(out, r#"<link title="/a.css" rel="stylesheet" href="/min/x.css">"#);
    }

    #[test]
    fn test_async_css() {
        let tag = r#"<link rel="stylesheet" href="/a.css" />"#;
        let out = async_css(tag, &attrs_of(tag)).unwrap();
        assert_eq!(
            out,
            r#"<link data-asynced='1' as='style' onload='this.rel="stylesheet"' rel="preload" href="/a.css" /><noscript><link rel="stylesheet" href="/a.css" /></noscript>"#
        );

        let tag = r#"<link rel="stylesheet" data-no-async href="/a.css">"#;
        assert!(async_css(tag, &attrs_of(tag)).is_none());
    }

    #[test]
    fn test_defer_rules() {
        let exclude = vec!["recaptcha".to_string()];
        let rules = DeferRules {
            exclude: &exclude,
            exclude_jquery: true,
        };

        let tag = r#"<script src="/app.js"></script>"#;
        assert_eq!(
            rules.apply(tag, &attrs_of(tag), "/app.js").unwrap(),
            r#"<script src="/app.js" defer data-deferred='1'></script>"#
        );

        let tag = r#"<script async src="/a.js"></script>"#;
        assert!(rules.apply(tag, &attrs_of(tag), "/a.js").is_none());

        let tag = r#"<script src="/recaptcha/api.js"></script>"#;
        assert!(rules.apply(tag, &attrs_of(tag), "/recaptcha/api.js").is_none());

        let tag = r#"<script src="/js/jquery.min.js"></script>"#;
        assert!(rules.apply(tag, &attrs_of(tag), "/js/jquery.min.js").is_none());
    }
}
