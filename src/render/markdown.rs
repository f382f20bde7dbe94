//! Markdown rendering for resolved content.

use crate::error::Result;
use crate::model::{Content, ContentType};

use super::RenderOptions;

/// Convert a content list to Markdown.
pub fn to_markdown(contents: &[Content], options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(contents)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render content items in order, one block each.
    pub fn render(&self, contents: &[Content]) -> Result<String> {
        let mut output = String::new();
        for content in contents {
            self.render_content(&mut output, content);
        }
        Ok(output.trim().to_string())
    }

    fn render_content(&self, output: &mut String, content: &Content) {
        let text = content.content.trim();
        if text.is_empty() {
            return;
        }

        match content.kind {
            ContentType::Title => {
                let heading = "#".repeat(self.options.heading_level.clamp(1, 6));
                // Headings are single-line
                let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
                output.push_str(&heading);
                output.push(' ');
                output.push_str(&self.escape(&line));
            }
            ContentType::Text if self.options.quote_descriptions && is_description(content) => {
                let quoted = text
                    .lines()
                    .map(|line| format!("> {}", self.escape(line)).trim_end().to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                output.push_str(&quoted);
            }
            ContentType::Text => output.push_str(&self.escape(text)),
        }
        output.push_str("\n\n");
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Content produced by describing a non-text block.
fn is_description(content: &Content) -> bool {
    !matches!(content.origin_type.as_str(), "text" | "title")
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
