//! Bookmark tree construction.
//!
//! A flat, pre-order outline tagged with levels is folded into a forest by
//! walking it backwards with a stack: every entry adopts the deeper entries
//! that follow it. Extents are then closed sibling by sibling.

use crate::model::{Anchor, BookMark, OutlineEntry, PageIndex};

/// Build the bookmark forest for a document of `page_count` pages.
///
/// Entries with a non-positive page, or one past the last page, are
/// discarded. An outline with no usable entry gives an empty forest.
pub fn build_bookmarks(entries: &[OutlineEntry], page_count: usize) -> Vec<BookMark> {
    let bookmarks: Vec<BookMark> = entries
        .iter()
        .filter(|entry| entry.page > 0 && entry.page as u64 <= page_count as u64)
        .map(|entry| {
            BookMark::new(
                entry.title.clone(),
                PageIndex::new(entry.page as usize - 1, entry.anchor),
                entry.level.saturating_sub(1) as usize,
            )
        })
        .collect();

    let dropped = entries.len() - bookmarks.len();
    if dropped > 0 {
        log::debug!("dropped {} outline entries outside the document", dropped);
    }

    let mut roots = nest(bookmarks);
    close_extents(&mut roots, page_count);
    roots
}

/// Fold a pre-order list into trees using the declared levels.
fn nest(bookmarks: Vec<BookMark>) -> Vec<BookMark> {
    let mut stack: Vec<BookMark> = Vec::new();

    for mut bookmark in bookmarks.into_iter().rev() {
        while stack.last().is_some_and(|top| top.level > bookmark.level) {
            if let Some(child) = stack.pop() {
                bookmark.subs.push(child);
            }
        }
        stack.push(bookmark);
    }

    stack.reverse();
    stack
}

/// Set `page_end` on every bookmark.
///
/// Each sibling ends where the next one starts; the last sibling ends where
/// its parent ends, and the last root ends on the last page.
fn close_extents(roots: &mut [BookMark], page_count: usize) {
    let document_end = PageIndex::new(page_count.saturating_sub(1), Anchor::NONE);
    link_siblings(roots, document_end);

    let mut pending: Vec<&mut BookMark> = roots.iter_mut().collect();
    while let Some(node) = pending.pop() {
        let end = node.page_end;
        link_siblings(&mut node.subs, end);
        pending.extend(node.subs.iter_mut());
    }
}

fn link_siblings(siblings: &mut [BookMark], last_end: PageIndex) {
    for i in 0..siblings.len() {
        let end = siblings
            .get(i + 1)
            .map_or(last_end, |next| next.page_start);
        siblings[i].set_page_end(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: u32, title: &str, page: i64) -> OutlineEntry {
        OutlineEntry::new(level, title, page, Anchor::NONE)
    }

    /// Check containment, contiguity and depth for a whole forest.
    fn assert_well_formed(roots: &[BookMark], page_count: usize) {
        if let Some(last) = roots.last() {
            assert_eq!(last.page_end.index, page_count - 1);
        }
        for pair in roots.windows(2) {
            assert_eq!(pair[0].page_end, pair[1].page_start);
        }

        let mut pending: Vec<(&BookMark, usize)> = roots.iter().map(|r| (r, 0)).collect();
        while let Some((node, depth)) = pending.pop() {
            assert_eq!(node.level, depth, "{} at wrong depth", node.title);
            assert!(node.page_start.index <= node.page_end.index);
            for child in &node.subs {
                assert!(child.page_start.index >= node.page_start.index);
                assert!(child.page_end.index <= node.page_end.index);
            }
            for pair in node.subs.windows(2) {
                assert_eq!(pair[0].page_end, pair[1].page_start);
            }
            pending.extend(node.subs.iter().map(|c| (c, depth + 1)));
        }
    }

    #[test]
    fn test_two_chapters_with_section() {
        let outline = vec![entry(1, "Ch1", 1), entry(2, "1.1", 1), entry(1, "Ch2", 5)];
        let roots = build_bookmarks(&outline, 10);

        assert_eq!(roots.len(), 2);
        let (ch1, ch2) = (&roots[0], &roots[1]);
        assert_eq!(ch1.title, "Ch1");
        assert_eq!(ch1.subs.len(), 1);
        assert_eq!(ch1.subs[0].title, "1.1");
        assert_eq!(ch1.page_end.index, 4);
        assert_eq!(ch2.page_end, PageIndex::new(9, Anchor::NONE));
        assert_eq!(ch1.subs[0].page_end, ch2.page_start);
        assert!(ch2.subs.is_empty());
        assert_well_formed(&roots, 10);
    }

    #[test]
    fn test_deep_nesting_and_level_jumps() {
        let outline = vec![
            entry(1, "A", 1),
            entry(3, "A.x.1", 2),
            entry(2, "A.1", 3),
            entry(3, "A.1.1", 3),
            entry(3, "A.1.2", 4),
            entry(2, "A.2", 6),
            entry(1, "B", 8),
        ];
        let roots = build_bookmarks(&outline, 12);

        assert_eq!(roots.len(), 2);
        let a = &roots[0];
        let titles: Vec<&str> = a.subs.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["A.x.1", "A.1", "A.2"]);
        assert_eq!(a.subs[1].subs.len(), 2);
        assert_eq!(a.subs[1].subs[1].page_end.index, 5);
        assert_eq!(a.subs[2].page_end.index, 7);
        assert_eq!(roots[1].page_end.index, 11);
    }

    #[test]
    fn test_level_equals_depth_for_regular_outline() {
        let outline = vec![
            entry(1, "1", 1),
            entry(2, "1.1", 2),
            entry(3, "1.1.1", 2),
            entry(2, "1.2", 4),
            entry(1, "2", 6),
            entry(2, "2.1", 7),
        ];
        let roots = build_bookmarks(&outline, 9);
        assert_well_formed(&roots, 9);
        assert_eq!(roots.iter().map(BookMark::count).sum::<usize>(), 6);
    }

    #[test]
    fn test_non_positive_and_out_of_range_pages_dropped() {
        let outline = vec![
            entry(1, "Cover", 0),
            entry(1, "Intro", 1),
            entry(1, "Link", -1),
            entry(1, "Appendix", 40),
        ];
        let roots = build_bookmarks(&outline, 3);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].title, "Intro");
        assert_eq!(roots[0].page_end.index, 2);
    }

    #[test]
    fn test_empty_outline_gives_empty_forest() {
        assert!(build_bookmarks(&[], 5).is_empty());
        assert!(build_bookmarks(&[entry(1, "Gone", -1)], 5).is_empty());
    }

    #[test]
    fn test_strategy_follows_anchor() {
        let outline = vec![
            OutlineEntry::new(1, "Anchored", 1, Anchor::new(-1.0, 120.0)),
            entry(1, "Titled", 2),
        ];
        let roots = build_bookmarks(&outline, 2);
        assert!(matches!(
            roots[0].strategy,
            crate::model::BoundaryStrategy::GeometricAnchor { y, .. } if y == 120.0
        ));
        assert_eq!(roots[1].strategy, crate::model::BoundaryStrategy::TitleMatch);
        assert_eq!(roots[0].page_end, roots[1].page_start);
    }

    #[test]
    fn test_level_zero_saturates() {
        let roots = build_bookmarks(&[entry(0, "Odd", 1)], 1);
        assert_eq!(roots[0].level, 0);
        assert_eq!(roots[0].id.rsplit(':').next(), Some("0"));
    }
}
