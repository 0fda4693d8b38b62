//! Minification of CSS, JavaScript and whole HTML documents.
//!
//! Uses oxc for JavaScript, lightningcss for CSS and minify-html for pages.
//! Callers treat every failure as "keep the unminified input".

use std::fmt;
use std::string::FromUtf8Error;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use thiserror::Error;

use crate::asset::AssetKind;

/// Input language of a minification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifyKind {
    Css,
    Js,
    Html,
}

impl From<AssetKind> for MinifyKind {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Css => Self::Css,
            AssetKind::Js => Self::Js,
        }
    }
}

impl fmt::Display for MinifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Css => "css",
            Self::Js => "js",
            Self::Html => "html",
        })
    }
}

/// Minification failures.
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("cannot parse {kind} input: {message}")]
    Parse { kind: MinifyKind, message: String },

    #[error("minifier returned empty {0} output")]
    Empty(MinifyKind),

    #[error("minified output is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// Byte transform applied to assets and pages.
pub trait Minifier: Send + Sync {
    fn minify(&self, source: &str, kind: MinifyKind) -> Result<String, MinifyError>;
}

/// oxc / lightningcss / minify-html backed minifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMinifier;

impl Minifier for DefaultMinifier {
    fn minify(&self, source: &str, kind: MinifyKind) -> Result<String, MinifyError> {
        match kind {
            MinifyKind::Css => minify_css(source),
            MinifyKind::Js => minify_js(source),
            MinifyKind::Html => minify_html(source),
        }
    }
}

/// Minify a classic (non-module) script. Top-level names are kept.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let source_type = SourceType::script();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(MinifyError::Parse {
            kind: MinifyKind::Js,
            message: format!("{} syntax errors", ret.errors.len()),
        });
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
    let parse_error = |message: String| MinifyError::Parse {
        kind: MinifyKind::Css,
        message,
    };
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| parse_error(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| parse_error(e.to_string()))?;
    Ok(result.code)
}

/// Minify a whole HTML document, keeping document-structure tags.
pub fn minify_html(source: &str) -> Result<String, MinifyError> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    let bytes = minify_html::minify(source.as_bytes(), &cfg);
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify_css("body {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_minify_js_keeps_globals() {
        let out = minify_js("function greet(name) {\n  return 'hi ' + name;\n}\n").unwrap();
        assert!(out.contains("greet"));
        assert!(out.len() < 50);
    }

    #[test]
    fn test_minify_js_keeps_unused_top_level() {
        let source = "function initMenu(el) {\n  el.open = true;\n}\nvar config = { a: 1 };\n";
        let out = minify_js(source).unwrap();
        assert!(out.contains("function initMenu("));
        assert!(out.contains("var config="));
    }

    #[test]
    fn test_minify_js_syntax_error() {
        let err = minify_js("function (").unwrap_err();
        assert!(matches!(err, MinifyError::Parse { kind: MinifyKind::Js, .. }));
    }

    #[test]
    fn test_minify_html_keeps_structure() {
        let html = "<html>\n  <head>\n    <title>x</title>\n  </head>\n  <body>\n    <p>hi</p>\n  </body>\n</html>\n";
        let out = DefaultMinifier.minify(html, MinifyKind::Html).unwrap();
        assert!(out.len() < html.len());
        assert!(out.contains("<head>"));
        assert!(out.contains("</body>"));
    }
}
