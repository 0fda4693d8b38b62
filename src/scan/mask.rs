//! Blanking of regions the scanner must not match inside.
//!
//! Masked regions are overwritten with spaces of the same byte length, so
//! every offset found in the masked copy is valid in the original.

use regex::Regex;
use std::sync::LazyLock;

/// HTML comments and `<noscript>` fallbacks.
static MASKED_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<noscript\b[^>]*>.*?</noscript\s*>").unwrap()
});

/// Copy of `html` with comments and noscript blocks replaced by spaces.
pub fn mask_inert(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for m in MASKED_REGION.find_iter(html) {
        out.push_str(&html[last..m.start()]);
        out.extend(std::iter::repeat_n(' ', m.len()));
        last = m.end();
    }
    out.push_str(&html[last..]);
    out
}
