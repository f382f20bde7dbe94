//! Data model for bookmark trees and page content.
//!
//! These types are what the crate returns: a forest of [`BookMark`]s with
//! resolved extents, and per-page or per-bookmark [`Content`] lists. All of
//! them serialize with serde.

mod bookmark;
mod content;
mod outline;

pub use bookmark::{Anchor, BookMark, BoundaryStrategy, PageIndex, ResourceRef};
pub use content::{BBox, Content, ContentType, Page};
pub use outline::{Destination, ObjectRef, OutlineEntry, RawOutlineEntry};
