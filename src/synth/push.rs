//! HTTP/2 server-push hints collected while a page is optimized.

use rustc_hash::FxHashSet;
use url::Url;

use crate::asset::AssetKind;

/// Ordered, de-duplicated `Link` header values.
#[derive(Debug, Clone, Default)]
pub struct PushHints {
    values: Vec<String>,
    seen: FxHashSet<String>,
}

impl PushHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a preload hint for `url`. Returns whether it was new.
    pub fn add(&mut self, url: &str, kind: AssetKind) -> bool {
        let value = format!("<{}>; rel=preload; as={}", to_uri(url), kind.preload_as());
        if !self.seen.insert(value.clone()) {
            return false;
        }
        self.values.push(value);
        true
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Path and query of an absolute or scheme-relative URL; relative input
/// is returned as written.
pub fn to_uri(url: &str) -> String {
    let parsed = if url.starts_with("//") {
        Url::parse(&format!("http:{url}"))
    } else {
        Url::parse(url)
    };
    match parsed {
        Ok(u) if u.has_host() => match u.query() {
            Some(q) => format!("{}?{}", u.path(), q),
            None => u.path().to_string(),
        },
        _ => url.to_string(),
    }
}
