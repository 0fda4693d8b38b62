//! References extracted from a page and their classification.

use std::ops::Range;

use super::{AssetKind, Position};
use crate::scan::Attributes;

/// A `<link>` or `<script>` tag referencing an asset.
///
/// Identity is the raw tag text: the same text appearing twice in a page is
/// one reference with two spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Value of `href` / `src`, as written in the page.
    pub url: String,
    /// The complete tag text, used for substitution.
    pub raw_tag: String,
    /// Position of the first occurrence.
    pub position: Position,
    pub kind: AssetKind,
    /// Parsed attributes of the tag.
    pub attrs: Attributes,
    /// Byte ranges of every non-commented occurrence, in document order.
    pub spans: Vec<Range<usize>>,
}

impl AssetReference {
    pub fn is_head(&self) -> bool {
        self.position == Position::Head
    }
}

/// Why a reference is left out of minify/combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeReason {
    /// Tag carries `data-no-optimize`.
    ExplicitExclude,
    /// URL hits a configured exclude pattern.
    ConfiguredExclude,
    /// Remote host, or the local file does not exist.
    External,
    /// jQuery library while jQuery exclusion is on.
    JqueryExcluded,
}

impl ExcludeReason {
    /// Pinned references stay exactly where they are, untouched.
    ///
    /// Other ineligible references travel with the combined output verbatim.
    #[inline]
    pub const fn is_pinned(self) -> bool {
        matches!(self, Self::ExplicitExclude | Self::ConfiguredExclude)
    }
}

/// Classifier output for one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedReference {
    pub reference: AssetReference,
    pub eligible: bool,
    pub reason: Option<ExcludeReason>,
    /// Size of the local file, known for internal references.
    pub file_size: Option<u64>,
}

impl ClassifiedReference {
    pub fn eligible(reference: AssetReference, file_size: u64) -> Self {
        Self {
            reference,
            eligible: true,
            reason: None,
            file_size: Some(file_size),
        }
    }

    pub fn excluded(reference: AssetReference, reason: ExcludeReason) -> Self {
        Self {
            reference,
            eligible: false,
            reason: Some(reason),
            file_size: None,
        }
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.reference.url
    }

    #[inline]
    pub fn raw_tag(&self) -> &str {
        &self.reference.raw_tag
    }

    /// Left in place and never rewritten.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.reason.is_some_and(ExcludeReason::is_pinned)
    }

    /// Ineligible but still relocated/wrapped with the rest of its kind.
    #[inline]
    pub fn is_ignored(&self) -> bool {
        !self.eligible && !self.is_pinned()
    }

    /// Internal file that may be push-hinted even though it is not optimized.
    #[inline]
    pub fn is_push_candidate(&self) -> bool {
        self.eligible || self.reason == Some(ExcludeReason::JqueryExcluded)
    }
}
