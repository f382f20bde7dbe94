//! Rendering options.

/// Options for Markdown rendering of resolved content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Heading level used for `Title` content (clamped to 1..=6)
    pub heading_level: usize,

    /// Whether to escape Markdown syntax characters in text
    pub escape_special_chars: bool,

    /// Whether figure and table descriptions are rendered as block quotes
    pub quote_descriptions: bool,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading level for titles.
    pub fn with_heading_level(mut self, level: usize) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    /// Enable or disable escaping.
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable or disable block quotes around model descriptions.
    pub fn with_quoted_descriptions(mut self, quote: bool) -> Self {
        self.quote_descriptions = quote;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_level: 2,
            escape_special_chars: true,
            quote_descriptions: true,
        }
    }
}
