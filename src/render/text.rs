//! Plain text rendering of bookmark trees.

use std::fmt::Write;

use crate::model::{BookMark, BoundaryStrategy};

/// Render a bookmark forest as an indented tree with one-based page ranges.
///
/// ```text
/// Chapter 1  [p. 1-5]
///   1.1 Scope  [p. 1-5] @(-1, 120)
/// ```
pub fn to_outline_text(bookmarks: &[BookMark]) -> String {
    let mut output = String::new();
    let mut pending: Vec<&BookMark> = bookmarks.iter().rev().collect();

    while let Some(bookmark) = pending.pop() {
        let _ = write!(
            output,
            "{}{}  [p. {}-{}]",
            "  ".repeat(bookmark.level),
            bookmark.title,
            bookmark.page_start.index + 1,
            bookmark.page_end.index + 1
        );
        if let BoundaryStrategy::GeometricAnchor { x, y } = bookmark.strategy {
            let _ = write!(output, " @({}, {})", x, y);
        }
        output.push('\n');
        pending.extend(bookmark.subs.iter().rev());
    }

    output
}
