//! Flat outline records, before and after anchor resolution.

use serde::{Deserialize, Serialize};

use super::Anchor;

/// A PDF object id: (object number, generation number).
pub type ObjectRef = (u32, u16);

/// Where an outline entry points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// Indirect destination behind a GoTo action on the outline item `xref`.
    Named { xref: ObjectRef },
    /// Explicit position, already in document space.
    Goto { x: f32, y: f32 },
    /// External or unsupported target.
    Other,
}

/// An outline entry as read from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutlineEntry {
    /// One-based nesting level
    pub level: u32,
    pub title: String,
    /// One-based target page, `-1` when unresolvable
    pub page: i64,
    pub destination: Destination,
}

/// A normalized outline entry: `(level, title, page, anchor)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// One-based nesting level
    pub level: u32,
    pub title: String,
    /// One-based target page; non-positive values are discarded later
    pub page: i64,
    pub anchor: Anchor,
}

impl OutlineEntry {
    pub fn new(level: u32, title: impl Into<String>, page: i64, anchor: Anchor) -> Self {
        Self {
            level,
            title: title.into(),
            page,
            anchor,
        }
    }
}
