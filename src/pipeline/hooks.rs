//! Extension points around the pipeline stages.
//!
//! Hooks are plain closures registered on a [`Hooks`] value and run in
//! registration order:
//!
//! - `pre_scan`: may rewrite the page before an asset kind is scanned.
//! - `post_classify`: may adjust each classification before processing.
//! - `pre_splice`: may edit the head/foot snippets right before injection.

use std::fmt;

use crate::asset::{AssetKind, ClassifiedReference};

/// Which pending snippet a `pre_splice` hook receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Head,
    Foot,
}

type PreScan = Box<dyn Fn(&str, AssetKind) -> Option<String> + Send + Sync>;
type PostClassify = Box<dyn Fn(&mut ClassifiedReference) + Send + Sync>;
type PreSplice = Box<dyn Fn(Injection, &mut String) + Send + Sync>;

/// Registered hook closures.
#[derive(Default)]
pub struct Hooks {
    pre_scan: Vec<PreScan>,
    post_classify: Vec<PostClassify>,
    pre_splice: Vec<PreSplice>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returning `Some(html)` replaces the page text.
    pub fn on_pre_scan<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, AssetKind) -> Option<String> + Send + Sync + 'static,
    {
        self.pre_scan.push(Box::new(f));
        self
    }

    pub fn on_post_classify<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ClassifiedReference) + Send + Sync + 'static,
    {
        self.post_classify.push(Box::new(f));
        self
    }

    pub fn on_pre_splice<F>(mut self, f: F) -> Self
    where
        F: Fn(Injection, &mut String) + Send + Sync + 'static,
    {
        self.pre_splice.push(Box::new(f));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pre_scan.is_empty() && self.post_classify.is_empty() && self.pre_splice.is_empty()
    }

    pub(crate) fn run_pre_scan(&self, html: &mut String, kind: AssetKind) {
        for hook in &self.pre_scan {
            if let Some(rewritten) = hook(html, kind) {
                *html = rewritten;
            }
        }
    }

    pub(crate) fn run_post_classify(&self, refs: &mut [ClassifiedReference]) {
        if self.post_classify.is_empty() {
            return;
        }
        for reference in refs {
            for hook in &self.post_classify {
                hook(reference);
            }
        }
    }

    pub(crate) fn run_pre_splice(&self, injection: Injection, snippet: &mut String) {
        for hook in &self.pre_splice {
            hook(injection, snippet);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_scan", &self.pre_scan.len())
            .field("post_classify", &self.post_classify.len())
            .field("pre_splice", &self.pre_splice.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_scan_chain() {
        let hooks = Hooks::new()
            .on_pre_scan(|html, _| Some(html.replace("a", "b")))
            .on_pre_scan(|_, kind| (kind == AssetKind::Js).then(|| "js".to_string()));

        let mut html = "aaa".to_string();
        hooks.run_pre_scan(&mut html, AssetKind::Css);
        assert_eq!(html, "bbb");
        hooks.run_pre_scan(&mut html, AssetKind::Js);
        assert_eq!(html, "js");
    }

    #[test]
    fn test_pre_splice_sees_injection() {
        let hooks = Hooks::new().on_pre_splice(|injection, s| {
            if injection == Injection::Foot {
                s.push_str("<!-- foot -->");
            }
        });
        let mut head = String::new();
        let mut foot = String::new();
        hooks.run_pre_splice(Injection::Head, &mut head);
        hooks.run_pre_splice(Injection::Foot, &mut foot);
        assert!(head.is_empty());
        assert_eq!(foot, "<!-- foot -->");
        assert!(!hooks.is_empty());
    }
}
