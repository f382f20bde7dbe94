//! JSON rendering for bookmark trees and content.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{BookMark, Content, Page};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a bookmark forest to JSON.
pub fn to_json(bookmarks: &[BookMark], format: JsonFormat) -> Result<String> {
    serialize(bookmarks, format)
}

/// Convert resolved bookmark content to JSON.
pub fn contents_to_json(contents: &[Content], format: JsonFormat) -> Result<String> {
    serialize(contents, format)
}

/// Convert assembled pages to JSON.
pub fn pages_to_json(pages: &[Page], format: JsonFormat) -> Result<String> {
    serialize(pages, format)
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, BBox, ContentType, PageIndex};

    fn forest() -> Vec<BookMark> {
        let mut chapter = BookMark::new("Chapter 1", PageIndex::new(0, Anchor::NONE), 0);
        chapter
            .subs
            .push(BookMark::new("1.1", PageIndex::new(1, Anchor::new(-1.0, 90.0)), 1));
        vec![chapter]
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&forest(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Chapter 1\""));
        assert!(json.contains("\"subs\""));
        assert!(json.contains("\"kind\": \"geometric_anchor\""));
        assert!(json.contains('\n')); // Pretty has newlines
    }

    #[test]
    fn test_to_json_compact_keeps_tree() {
        let bookmarks = forest();
        let json = to_json(&bookmarks, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines

        let back: Vec<BookMark> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bookmarks);
    }

    #[test]
    fn test_contents_to_json() {
        let contents = vec![Content::new(
            ContentType::Text,
            "Body",
            BBox::new(1.0, 2.0, 3.0, 4.0),
            "text",
        )];
        let json = contents_to_json(&contents, JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"text","content":"Body","bbox":{"x1":1.0,"y1":2.0,"x2":3.0,"y2":4.0},"origin_type":"text"}]"#
        );
    }

    #[test]
    fn test_pages_to_json() {
        let json = pages_to_json(&[Page::new(3, Vec::new())], JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"[{"page_index":3,"contents":[]}]"#);
    }
}
