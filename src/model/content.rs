//! Page content types.

use serde::{Deserialize, Serialize};

/// Bounding box `(x1, y1, x2, y2)` with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Divide every coordinate by `factor`.
    pub fn scaled_down(&self, factor: f32) -> Self {
        Self {
            x1: self.x1 / factor,
            y1: self.y1 / factor,
            x2: self.x2 / factor,
            y2: self.y2 / factor,
        }
    }

    /// Whether the point lies inside the box (edges included).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

impl From<[f32; 4]> for BBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Coarse role of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Title,
    Text,
}

/// One recognized block of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: ContentType,

    /// Recognized or described text
    pub content: String,

    /// Location in document space
    pub bbox: BBox,

    /// Block tag reported by the layout model ("title", "figure", ...)
    pub origin_type: String,
}

impl Content {
    pub fn new(
        kind: ContentType,
        content: impl Into<String>,
        bbox: BBox,
        origin_type: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            bbox,
            origin_type: origin_type.into(),
        }
    }

    pub fn is_title(&self) -> bool {
        self.kind == ContentType::Title
    }
}

/// The assembled content of one page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// One-based page number
    pub page_index: usize,

    /// Content in reading order as reported by the layout model
    pub contents: Vec<Content>,
}

impl Page {
    pub fn new(page_index: usize, contents: Vec<Content>) -> Self {
        Self {
            page_index,
            contents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Concatenated text of all content items.
    pub fn plain_text(&self) -> String {
        self.contents
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
