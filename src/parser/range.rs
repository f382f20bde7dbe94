//! Content range resolution.
//!
//! A bookmark owns the content from its heading on the start page up to the
//! next section's heading on the end page. Pages in between are taken whole.

use crate::error::Result;
use crate::model::{BookMark, BoundaryStrategy, Content};

/// Collect the content owned by `bookmark`.
///
/// `load_page` returns the assembled content of a zero-based page. The
/// result is always one contiguous run of the concatenated page contents.
pub fn resolve_contents<F>(bookmark: &BookMark, mut load_page: F) -> Result<Vec<Content>>
where
    F: FnMut(usize) -> Result<Vec<Content>>,
{
    let start = bookmark.page_start.index;
    let end = bookmark.page_end.index;
    let title = strip_whitespace(&bookmark.title);
    let mut contents = Vec::new();

    for index in start..=end {
        let mut page = load_page(index)?;

        if index == start {
            if let Some(offset) = start_offset(&bookmark.strategy, &title, &page) {
                page.drain(..offset);
            }
        }

        // Searched on the already trimmed page, so a single-page range
        // closes on its own heading.
        if index == end {
            let cut = end_offset(&bookmark.strategy, &page).unwrap_or(page.len());
            page.truncate(cut);
        }

        contents.extend(page);
    }

    log::debug!(
        "bookmark {:?} resolved to {} content items over pages {}..={}",
        bookmark.title,
        contents.len(),
        start,
        end
    );
    Ok(contents)
}

/// Index of the first item that belongs to the bookmark on its start page.
pub fn start_offset(strategy: &BoundaryStrategy, title: &str, page: &[Content]) -> Option<usize> {
    match *strategy {
        BoundaryStrategy::TitleMatch => page.iter().position(|content| {
            content.is_title() && title.contains(&strip_whitespace(&content.content))
        }),
        BoundaryStrategy::GeometricAnchor { x, y } => {
            page.iter().position(|content| below_anchor(content, x, y))
        }
    }
}

/// Index of the first item on the end page that no longer belongs to it.
pub fn end_offset(strategy: &BoundaryStrategy, page: &[Content]) -> Option<usize> {
    match *strategy {
        BoundaryStrategy::TitleMatch => page.iter().position(Content::is_title),
        BoundaryStrategy::GeometricAnchor { x, y } => {
            page.iter().position(|content| below_anchor(content, x, y))
        }
    }
}

fn below_anchor(content: &Content, x: f32, y: f32) -> bool {
    content.bbox.x1 > x && content.bbox.y1 > y
}

/// Remove every whitespace character.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
