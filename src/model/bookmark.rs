//! Bookmark tree types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A position on a page, in document space with a top-left origin.
///
/// [`Anchor::NONE`] marks an entry that carries no usable coordinate; its
/// content boundaries are found by matching the bookmark title instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    /// The "no geometric anchor" sentinel, `(-1, -1)`.
    pub const NONE: Anchor = Anchor { x: -1.0, y: -1.0 };

    /// The placeholder used for an end position that is not resolved yet.
    pub const ORIGIN: Anchor = Anchor { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Whether this is the [`Anchor::NONE`] sentinel.
    pub fn is_none(&self) -> bool {
        self.x == -1.0 && self.y == -1.0
    }
}

impl From<(f32, f32)> for Anchor {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A zero-based page index plus the anchor on that page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageIndex {
    pub index: usize,
    pub anchor: Anchor,
}

impl PageIndex {
    pub fn new(index: usize, anchor: Anchor) -> Self {
        Self { index, anchor }
    }
}

/// How the first and last page of a bookmark's extent are trimmed.
///
/// Chosen once from the start anchor when the bookmark is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryStrategy {
    /// Locate the bookmark by its title among `Title` content items.
    TitleMatch,
    /// Locate the bookmark by position: content right of `x` and below `y`.
    GeometricAnchor { x: f32, y: f32 },
}

impl BoundaryStrategy {
    pub fn from_anchor(anchor: Anchor) -> Self {
        if anchor.is_none() {
            BoundaryStrategy::TitleMatch
        } else {
            BoundaryStrategy::GeometricAnchor {
                x: anchor.x,
                y: anchor.y,
            }
        }
    }
}

/// An opaque resource attached to a bookmark by downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource kind (e.g. "slides", "video")
    pub kind: String,
    /// Where the resource lives
    pub uri: String,
}

/// A node in the bookmark tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMark {
    /// Unique id, `1:<uuid>:<level>`
    pub id: String,

    /// Title as declared by the outline
    pub title: String,

    /// Where the bookmark's content begins
    pub page_start: PageIndex,

    /// Where the bookmark's content ends (the next section's start)
    pub page_end: PageIndex,

    /// Zero-based nesting depth
    pub level: usize,

    /// Child bookmarks in declaration order
    pub subs: Vec<BookMark>,

    /// Resources attached downstream
    pub resource: Vec<ResourceRef>,

    /// Boundary strategy derived from `page_start.anchor`
    pub strategy: BoundaryStrategy,
}

impl BookMark {
    /// Create a leaf bookmark with an unresolved end.
    pub fn new(title: impl Into<String>, page_start: PageIndex, level: usize) -> Self {
        Self {
            id: format!("1:{}:{}", Uuid::new_v4().simple(), level),
            title: title.into(),
            strategy: BoundaryStrategy::from_anchor(page_start.anchor),
            page_start,
            page_end: PageIndex::new(0, Anchor::ORIGIN),
            level,
            subs: Vec::new(),
            resource: Vec::new(),
        }
    }

    pub fn set_page_end(&mut self, page_end: PageIndex) {
        self.page_end = page_end;
    }

    /// Number of pages spanned, counting both ends.
    pub fn page_span(&self) -> usize {
        self.page_end
            .index
            .saturating_sub(self.page_start.index)
            .saturating_add(1)
    }

    /// Total number of bookmarks in this subtree, including `self`.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(bookmark) = pending.pop() {
            total += 1;
            pending.extend(bookmark.subs.iter());
        }
        total
    }

    /// Depth-first, pre-order walk of this subtree.
    pub fn walk(&self) -> Vec<&BookMark> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(bookmark) = pending.pop() {
            out.push(bookmark);
            pending.extend(bookmark.subs.iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_sentinel() {
        assert!(Anchor::NONE.is_none());
        assert!(!Anchor::new(-1.0, 30.0).is_none());
        assert!(!Anchor::ORIGIN.is_none());
    }

    #[test]
    fn test_strategy_from_anchor() {
        assert_eq!(
            BoundaryStrategy::from_anchor(Anchor::NONE),
            BoundaryStrategy::TitleMatch
        );
        assert_eq!(
            BoundaryStrategy::from_anchor(Anchor::new(-1.0, 120.0)),
            BoundaryStrategy::GeometricAnchor { x: -1.0, y: 120.0 }
        );
    }

    #[test]
    fn test_bookmark_id_format() {
        let bookmark = BookMark::new("Intro", PageIndex::new(0, Anchor::NONE), 2);
        let parts: Vec<&str> = bookmark.id.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "1");
        assert_eq!(parts[1].len(), 32);
        assert_eq!(parts[2], "2");
        assert_eq!(bookmark.page_end, PageIndex::new(0, Anchor::ORIGIN));
    }

    #[test]
    fn test_bookmark_ids_unique() {
        let a = BookMark::new("A", PageIndex::new(0, Anchor::NONE), 0);
        let b = BookMark::new("A", PageIndex::new(0, Anchor::NONE), 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_walk_is_preorder() {
        let mut root = BookMark::new("1", PageIndex::new(0, Anchor::NONE), 0);
        let mut child = BookMark::new("1.1", PageIndex::new(1, Anchor::NONE), 1);
        child
            .subs
            .push(BookMark::new("1.1.1", PageIndex::new(1, Anchor::NONE), 2));
        root.subs.push(child);
        root.subs
            .push(BookMark::new("1.2", PageIndex::new(2, Anchor::NONE), 1));

        let titles: Vec<&str> = root.walk().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["1", "1.1", "1.1.1", "1.2"]);
        assert_eq!(root.count(), 4);
    }

    #[test]
    fn test_page_span() {
        let mut bookmark = BookMark::new("A", PageIndex::new(3, Anchor::NONE), 0);
        bookmark.set_page_end(PageIndex::new(5, Anchor::NONE));
        assert_eq!(bookmark.page_span(), 3);
    }
}
