//! XML text and attribute escaping.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static XML_SPECIAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[&<>"]"#).unwrap());

static XML_SPECIAL_OR_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)&(?:#x[a-f0-9]{1,6}|#[0-9]{1,7}|[a-z][a-z0-9]{1,31});|[&<>"]"#).unwrap()
});

/// Escape `&`, `<`, `>` and `"` for XML text and attribute values.
///
/// With `preserve_entities`, well-formed character and entity references
/// (`&amp;`, `&#42;`, `&#x2A;`) pass through untouched so that already
/// escaped link destinations are not double-escaped.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
///
/// # Examples
///
/// ```
/// use cm_renderer::escape_xml;
///
/// assert_eq!(escape_xml("a < b", false), "a &lt; b");
/// assert_eq!(escape_xml("&copy; &", true), "&copy; &amp;");
/// assert_eq!(escape_xml("&copy;", false), "&amp;copy;");
/// ```
pub fn escape_xml(text: &str, preserve_entities: bool) -> Cow<'_, str> {
    if !XML_SPECIAL.is_match(text) {
        return Cow::Borrowed(text);
    }
    let pattern = if preserve_entities {
        &*XML_SPECIAL_OR_ENTITY
    } else {
        &*XML_SPECIAL
    };
    pattern.replace_all(text, |caps: &regex::Captures<'_>| {
        replace_unsafe_char(&caps[0]).to_owned()
    })
}

fn replace_unsafe_char(s: &str) -> &str {
    match s {
        "&" => "&amp;",
        "<" => "&lt;",
        ">" => "&gt;",
        "\"" => "&quot;",
        // Entity reference kept as written.
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(escape_xml("<script>", false), "&lt;script&gt;");
        assert_eq!(escape_xml("a & b", false), "a &amp; b");
        assert_eq!(escape_xml(r#""quoted""#, false), "&quot;quoted&quot;");
    }

    #[test]
    fn test_single_quote_untouched() {
        assert_eq!(escape_xml("it's", false), "it's");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape_xml("plain", true), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_entities_escaped_without_preserve() {
        assert_eq!(escape_xml("&amp;", false), "&amp;amp;");
        assert_eq!(escape_xml("&#35;", false), "&amp;#35;");
    }

    #[test]
    fn test_entities_preserved() {
        assert_eq!(escape_xml("&amp;", true), "&amp;");
        assert_eq!(escape_xml("&#35;", true), "&#35;");
        assert_eq!(escape_xml("&#X22;", true), "&#X22;");
        assert_eq!(escape_xml("&Copy;", true), "&Copy;");
    }

    #[test]
    fn test_malformed_entities_escaped_with_preserve() {
        assert_eq!(escape_xml("&;", true), "&amp;;");
        assert_eq!(escape_xml("&#;", true), "&amp;#;");
        assert_eq!(escape_xml("&#12345678;", true), "&amp;#12345678;");
        assert_eq!(escape_xml("& b", true), "&amp; b");
        assert_eq!(escape_xml("/url?a=1&b=2", true), "/url?a=1&amp;b=2");
    }
}
