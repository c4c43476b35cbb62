//! Per-render output buffer.
//!
//! A [`RenderSession`] lives for exactly one render call. It owns the output
//! string, remembers the last character written (for newline normalization)
//! and counts how many images enclose the current node (tag suppression).

use crate::escape::escape_xml;

/// Attribute name and already-escaped value.
pub(crate) type Attr = (&'static str, String);

pub(crate) struct RenderSession {
    buffer: String,
    /// Seeded with a newline so the document never starts with one.
    last_char: char,
    /// Number of enclosing images; output is dropped while non-zero.
    suppression: usize,
}

impl RenderSession {
    pub(crate) fn new() -> Self {
        Self {
            buffer: String::with_capacity(4096),
            last_char: '\n',
            suppression: 0,
        }
    }

    pub(crate) fn is_suppressed(&self) -> bool {
        self.suppression > 0
    }

    /// Enter an image. Returns `true` for the outermost one.
    pub(crate) fn suppress(&mut self) -> bool {
        self.suppression += 1;
        self.suppression == 1
    }

    /// Leave an image. Returns `true` once no image encloses the output.
    pub(crate) fn unsuppress(&mut self) -> bool {
        self.suppression = self.suppression.saturating_sub(1);
        self.suppression == 0
    }

    /// Append without consulting the suppression depth.
    pub(crate) fn write_raw(&mut self, text: &str) {
        if let Some(last) = text.chars().next_back() {
            self.buffer.push_str(text);
            self.last_char = last;
        }
    }

    /// Append verbatim text.
    pub(crate) fn lit(&mut self, text: &str) {
        if !self.is_suppressed() {
            self.write_raw(text);
        }
    }

    /// Append text escaped for XML.
    pub(crate) fn out(&mut self, text: &str) {
        if !self.is_suppressed() {
            self.write_raw(&escape_xml(text, false));
        }
    }

    /// Append a newline unless the output already ends with one.
    pub(crate) fn cr(&mut self) {
        if self.last_char != '\n' {
            self.lit("\n");
        }
    }

    /// Append an opening, closing (`/name`) or self-closing tag.
    pub(crate) fn tag(&mut self, name: &str, attrs: &[Attr], self_closing: bool) {
        if self.is_suppressed() {
            return;
        }
        self.buffer.push('<');
        self.buffer.push_str(name);
        for (key, value) in attrs {
            self.buffer.push(' ');
            self.buffer.push_str(key);
            self.buffer.push_str("=\"");
            self.buffer.push_str(value);
            self.buffer.push('"');
        }
        if self_closing {
            self.buffer.push_str(" /");
        }
        self.buffer.push('>');
        self.last_char = '>';
    }

    pub(crate) fn finish(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cr_suppressed_at_start() {
        let mut session = RenderSession::new();
        session.cr();
        assert_eq!(session.finish(), "");
    }

    #[test]
    fn test_cr_is_idempotent() {
        let mut session = RenderSession::new();
        session.lit("a");
        session.cr();
        session.cr();
        session.cr();
        session.lit("b");
        assert_eq!(session.finish(), "a\nb");
    }

    #[test]
    fn test_cr_after_literal_ending_in_newline() {
        let mut session = RenderSession::new();
        session.lit("a\n");
        session.cr();
        assert_eq!(session.finish(), "a\n");
    }

    #[test]
    fn test_empty_literal_keeps_last_char() {
        let mut session = RenderSession::new();
        session.lit("a");
        session.lit("");
        session.cr();
        assert_eq!(session.finish(), "a\n");
    }

    #[test]
    fn test_out_escapes() {
        let mut session = RenderSession::new();
        session.out("<a & b>");
        assert_eq!(session.finish(), "&lt;a &amp; b&gt;");
    }

    #[test]
    fn test_tag_with_attrs() {
        let mut session = RenderSession::new();
        session.tag("a", &[("href", "/x".to_owned()), ("title", "t".to_owned())], false);
        session.tag("/a", &[], false);
        session.tag("br", &[], true);
        assert_eq!(session.finish(), r#"<a href="/x" title="t"></a><br />"#);
    }

    #[test]
    fn test_suppression_drops_everything_but_raw() {
        let mut session = RenderSession::new();
        assert!(session.suppress());
        assert!(!session.suppress());
        session.tag("em", &[], false);
        session.out("text");
        session.lit("lit");
        session.cr();
        session.write_raw("raw");
        assert!(!session.unsuppress());
        assert!(session.unsuppress());
        session.lit("!");
        assert_eq!(session.finish(), "raw!");
    }

    #[test]
    fn test_unsuppress_saturates() {
        let mut session = RenderSession::new();
        assert!(session.unsuppress());
        assert!(!session.is_suppressed());
    }
}
