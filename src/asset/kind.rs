//! Asset kind definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of page asset handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Stylesheet referenced by `<link rel="stylesheet">`.
    Css,
    /// Script referenced by `<script src>`.
    Js,
}

impl AssetKind {
    /// File extension of generated files, also the registry key suffix.
    #[inline]
    pub const fn ext(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Value of the `as=` parameter in a preload hint.
    #[inline]
    pub const fn preload_as(self) -> &'static str {
        match self {
            Self::Css => "style",
            Self::Js => "script",
        }
    }

    /// Element name carrying this kind of reference.
    #[inline]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Css => "link",
            Self::Js => "script",
        }
    }

    /// Attribute holding the referenced URL.
    #[inline]
    pub const fn url_attr(self) -> &'static str {
        match self {
            Self::Css => "href",
            Self::Js => "src",
        }
    }

    /// Response content type for a generated file.
    #[inline]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Css => "text/css; charset=utf-8",
            Self::Js => "application/x-javascript",
        }
    }

    /// Parse from a file extension.
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Where a tag sits relative to the closing `</head>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Head,
    Body,
}
