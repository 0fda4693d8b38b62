//! Single-pass substitution of byte ranges.

use std::ops::Range;

use crate::debug;

/// Replacements keyed by byte range in one document.
#[derive(Debug, Clone, Default)]
pub struct Splice {
    edits: Vec<(Range<usize>, String)>,
}

impl Splice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every span with `with`.
    pub fn replace(&mut self, spans: &[Range<usize>], with: &str) {
        self.edits
            .extend(spans.iter().map(|span| (span.clone(), with.to_string())));
    }

    /// Remove every span.
    pub fn remove(&mut self, spans: &[Range<usize>]) {
        self.replace(spans, "");
    }

    /// Insert text at a byte offset.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.edits.push((at..at, text.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Build the edited document. Overlapping or out-of-bounds edits are
    /// dropped; insertions at the same offset keep their order.
    pub fn apply(mut self, content: &str) -> String {
        if self.edits.is_empty() {
            return content.to_string();
        }
        self.edits.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(content.len());
        let mut cursor = 0;
        for (range, text) in self.edits {
            let in_bounds = range.end <= content.len()
                && content.is_char_boundary(range.start)
                && content.is_char_boundary(range.end);
            if range.start < cursor || !in_bounds {
                debug!("splice"; "dropping edit at {:?}", range);
                continue;
            }
            out.push_str(&content[cursor..range.start]);
            out.push_str(&text);
            cursor = range.end;
        }
        out.push_str(&content[cursor..]);
        out
    }
}
