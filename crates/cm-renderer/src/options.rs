//! Render options.

/// Soft breaks render as newlines unless configured otherwise.
pub const DEFAULT_SOFT_BREAK: &str = "\n";

/// Options fixed for the lifetime of an [`HtmlRenderer`](crate::HtmlRenderer).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RenderOptions {
    /// Text emitted for a soft line break.
    ///
    /// `"<br />\n"` turns soft breaks into hard breaks, `" "` ignores source
    /// line wrapping.
    pub soft_break: String,
    /// Drop unsafe link and image destinations and omit raw HTML.
    pub safe: bool,
    /// Add `data-sourcepos` attributes to block tags.
    pub source_pos: bool,
    /// Write the plain text of an image's content into its `alt` attribute.
    ///
    /// Off by default: nested content of an image is suppressed entirely.
    pub alt_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            soft_break: DEFAULT_SOFT_BREAK.to_owned(),
            safe: false,
            source_pos: false,
            alt_text: false,
        }
    }
}

impl RenderOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the soft break text. An empty string restores the default.
    #[must_use]
    pub fn with_soft_break(mut self, text: impl Into<String>) -> Self {
        self.soft_break = text.into();
        self
    }

    /// Enable or disable safe mode.
    #[must_use]
    pub fn with_safe(mut self, enabled: bool) -> Self {
        self.safe = enabled;
        self
    }

    /// Enable or disable `data-sourcepos` attributes.
    #[must_use]
    pub fn with_source_pos(mut self, enabled: bool) -> Self {
        self.source_pos = enabled;
        self
    }

    /// Enable or disable plain-text alt attributes for images.
    #[must_use]
    pub fn with_alt_text(mut self, enabled: bool) -> Self {
        self.alt_text = enabled;
        self
    }

    /// Soft break text, falling back to a newline when unset.
    pub fn soft_break(&self) -> &str {
        if self.soft_break.is_empty() {
            DEFAULT_SOFT_BREAK
        } else {
            &self.soft_break
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.soft_break(), "\n");
        assert!(!options.safe);
        assert!(!options.source_pos);
        assert!(!options.alt_text);
    }

    #[test]
    fn test_empty_soft_break_falls_back() {
        let options = RenderOptions::new().with_soft_break("");
        assert_eq!(options.soft_break(), "\n");
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_soft_break(" ")
            .with_safe(true)
            .with_source_pos(true)
            .with_alt_text(true);
        assert_eq!(options.soft_break(), " ");
        assert!(options.safe);
        assert!(options.source_pos);
        assert!(options.alt_text);
    }
}
