//! Rendering module for converting bookmark trees and content to output formats.

mod json;
mod markdown;
mod options;
mod text;

pub use json::{contents_to_json, pages_to_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::RenderOptions;
pub use text::to_outline_text;
