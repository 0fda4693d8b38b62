//! Mutable document state for one optimization run.

use regex::Regex;
use std::sync::LazyLock;

use super::{PushHints, Splice};
use crate::scan::mask_inert;

/// Insertion point for head content: after `<meta charset>`.
static META_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta\s+charset\b[^>]*>").unwrap());

/// Fallback insertion point: after the opening `<head>`.
static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(\s[^>]*)?>").unwrap());

static BODY_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());

/// Document text plus the pending head/foot injections and push hints.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuffer {
    content: String,
    head: String,
    foot: String,
    push: PushHints,
}

impl DocumentBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut String {
        &mut self.content
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }

    /// Apply substitutions computed against the current content.
    pub fn apply(&mut self, splice: Splice) {
        if !splice.is_empty() {
            self.content = splice.apply(&self.content);
        }
    }

    pub fn head_mut(&mut self) -> &mut String {
        &mut self.head
    }

    pub fn foot_mut(&mut self) -> &mut String {
        &mut self.foot
    }

    pub fn push_head(&mut self, html: &str) {
        self.head.push_str(html);
    }

    /// Queue `html` for the head unless the page or the queue already has it.
    pub fn push_head_once(&mut self, html: &str) -> bool {
        if self.content.contains(html) || self.head.contains(html) {
            return false;
        }
        self.head.push_str(html);
        true
    }

    pub fn push_foot(&mut self, html: &str) {
        self.foot.push_str(html);
    }

    pub fn hints_mut(&mut self) -> &mut PushHints {
        &mut self.push
    }

    pub fn has_injections(&self) -> bool {
        !self.head.is_empty() || !self.foot.is_empty()
    }

    /// Splice queued head content after `<meta charset>` (else after
    /// `<head>`, else at the start) and foot content before the last
    /// `</body>` (else at the end). Commented-out markup never counts.
    pub fn inject(&mut self) {
        if !self.has_injections() {
            return;
        }
        let masked = mask_inert(&self.content);
        let mut splice = Splice::new();

        let head = std::mem::take(&mut self.head);
        if !head.is_empty() {
            let at = META_CHARSET
                .find(&masked)
                .or_else(|| HEAD_OPEN.find(&masked))
                .map_or(0, |m| m.end());
            splice.insert(at, head);
        }

        let foot = std::mem::take(&mut self.foot);
        if !foot.is_empty() {
            let at = BODY_CLOSE
                .find_iter(&masked)
                .last()
                .map_or(masked.len(), |m| m.start());
            splice.insert(at, foot);
        }

        self.apply(splice);
    }

    /// Final document and collected push hints.
    pub fn finish(self) -> (String, Vec<String>) {
        (self.content, self.push.into_values())
    }
}
