//! Config field path used in diagnostics.

use owo_colors::OwoColorize;
use std::fmt;

/// Dotted path of a config field, e.g. `optimize.max_combined_bytes`.
///
/// Sections declare their paths as associated constants:
///
/// ```ignore
/// impl OptimizeConfig {
///     pub const MAX_COMBINED_BYTES: FieldPath = FieldPath::new("optimize.max_combined_bytes");
/// }
///
/// diag.error(OptimizeConfig::MAX_COMBINED_BYTES, "must be greater than 0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
