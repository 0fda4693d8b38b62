//! Rebasing of relative `url(...)` references in stylesheets.
//!
//! A generated stylesheet is served from the generated-file prefix, so
//! relative references written against the source file's directory are
//! turned into root-relative (or absolute) URLs first.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*(['"]?)([^'")]*?)(['"]?)\s*\)"#).unwrap());

/// Placeholder origin for root-relative sources.
static LOCAL_ORIGIN: LazyLock<Option<Url>> = LazyLock::new(|| Url::parse("http://localhost/").ok());

/// Whether a `url(...)` target needs no rebasing.
fn is_fixed(target: &str) -> bool {
    target.is_empty()
        || target.starts_with('/')
        || target.starts_with('#')
        || target.contains(':')
}

/// Rewrite relative `url(...)` targets in `css` against `source_url`.
pub fn rebase_urls<'a>(css: &'a str, source_url: &str) -> Cow<'a, str> {
    let absolute = Url::parse(source_url).ok().filter(Url::has_host);
    let base = match &absolute {
        Some(url) => Some(url.clone()),
        None => LOCAL_ORIGIN.as_ref().and_then(|o| o.join(source_url).ok()),
    };
    let Some(base) = base else {
        return Cow::Borrowed(css);
    };

    CSS_URL.replace_all(css, |caps: &Captures<'_>| {
        let target = &caps[2];
        if is_fixed(target) {
            return caps[0].to_string();
        }
        match base.join(target) {
            Ok(joined) => {
                let rebased = if absolute.is_some() {
                    joined.to_string()
                } else {
                    path_and_query(&joined)
                };
                format!("url({}{}{})", &caps[1], rebased, &caps[3])
            }
            Err(_) => caps[0].to_string(),
        }
    })
}

fn path_and_query(url: &Url) -> String {
    let mut out = url.path().to_string();
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative_source() {
        let css = r#"a{background:url(../img/a.png)} b{src:url("font.woff2?v=1")}"#;
        assert_eq!(
            rebase_urls(css, "/wp-content/theme/css/style.css"),
            r#"a{background:url(/wp-content/theme/img/a.png)} b{src:url("/wp-content/theme/css/font.woff2?v=1")}"#
        );
    }

    #[test]
    fn test_absolute_source() {
        let css = "a{background:url('img/a.png')}";
        assert_eq!(
            rebase_urls(css, "https://example.com/css/site.css"),
            "a{background:url('https://example.com/css/img/a.png')}"
        );
    }

    #[test]
    fn test_fixed_targets_untouched() {
        let css = "a{background:url(/a.png)} b{background:url(data:image/png;base64,AAAA)} c{filter:url(#f)}";
        assert_eq!(rebase_urls(css, "/css/x.css"), css);
    }
}
