//! HTML attribute parsing for scanned tags.

use crate::error::PipelineError;

/// Parsed attributes of one tag, in source order.
///
/// Names are lowercased; values keep their original text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Value of an attribute (`""` for bare attributes).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Present with a value other than `""` or `"0"`.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty() && v != "0")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse HTML-style attributes from the inside of a tag.
///
/// Input: `rel='stylesheet' href="/a.css" media=all async`
/// Output: `[("rel", "stylesheet"), ("href", "/a.css"), ("media", "all"), ("async", "")]`
///
/// A trailing `/` of a self-closing tag is ignored. An unterminated quoted
/// value fails the whole tag.
pub fn parse_attributes(s: &str) -> Result<Attributes, PipelineError> {
    let s = s.trim_end().trim_end_matches('/');
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        // Read attribute name
        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            attrs.push((name.to_ascii_lowercase(), String::new()));
            continue;
        }
        chars.next(); // consume '='

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        let value = match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut val = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    val.push(c);
                }
                if !closed {
                    return Err(PipelineError::ParseSkip { tag: s.to_string() });
                }
                val
            }
            _ => {
                // Unquoted value (read until whitespace)
                let mut val = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    val.push(c);
                    chars.next();
                }
                val
            }
        };
        attrs.push((name.to_ascii_lowercase(), value));
    }

    Ok(Attributes(attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_quotes() {
        let attrs =
            parse_attributes(r#"rel='stylesheet' HREF="/a.css?ver=1" media=all async"#).unwrap();
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs.get("rel"), Some("stylesheet"));
        assert_eq!(attrs.get("href"), Some("/a.css?ver=1"));
        assert_eq!(attrs.get("media"), Some("all"));
        assert_eq!(attrs.get("async"), Some(""));
    }

    #[test]
    fn test_self_closing_slash() {
        let attrs = parse_attributes("rel=stylesheet href=/a.css /").unwrap();
        assert_eq!(attrs.get("href"), Some("/a.css"));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_spaces_around_equals() {
        let attrs = parse_attributes(r#"src = "/x.js" defer"#).unwrap();
        assert_eq!(attrs.get("src"), Some("/x.js"));
        assert!(attrs.has("defer"));
    }

    #[test]
    fn test_truthy() {
        let attrs = parse_attributes(r#"data-a="1" data-b="0" data-c"#).unwrap();
        assert!(attrs.is_truthy("data-a"));
        assert!(!attrs.is_truthy("data-b"));
        assert!(!attrs.is_truthy("data-c"));
        assert!(attrs.has("data-c"));
        assert!(!attrs.is_truthy("data-d"));
    }

    #[test]
    fn test_unterminated_quote_fails() {
        assert!(parse_attributes(r#"src="/x.js"#).is_err());
    }
}
