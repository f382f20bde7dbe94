//! Outline extraction and normalization.
//!
//! Raw entries come from the backend with a [`Destination`]; each is turned
//! into an [`OutlineEntry`] whose anchor is either a document-space position
//! or [`Anchor::NONE`]. Entries pointing outside the document are dropped.

use crate::error::{Error, Result};
use crate::inference::{response, LanguageModel, PromptBuilder};
use crate::model::{Anchor, Destination, ObjectRef, OutlineEntry};

use super::backend::PdfBackend;

/// Read the document outline and resolve every entry's anchor.
pub fn extract_outline<B: PdfBackend + ?Sized>(backend: &B) -> Result<Vec<OutlineEntry>> {
    let raw = backend.outline_entries()?;
    let mut outline = Vec::with_capacity(raw.len());

    for entry in raw {
        let page_height = usize::try_from(entry.page - 1)
            .ok()
            .and_then(|index| backend.page_size(index).ok())
            .map(|(_, height)| height);

        match resolve_anchor(&entry.destination, page_height, |xref| backend.resolve_fit_h(xref)) {
            Some(anchor) => {
                outline.push(OutlineEntry::new(entry.level, entry.title, entry.page, anchor))
            }
            None => log::debug!("dropping outline entry {:?} without a local target", entry.title),
        }
    }

    log::debug!("extracted {} outline entries", outline.len());
    Ok(outline)
}

/// Turn a destination into an anchor.
///
/// `page_height` is the target page's height at zoom 1. Named destinations
/// that cannot be resolved, for any reason, give [`Anchor::NONE`]. Returns
/// `None` for destinations that are not followed at all.
pub fn resolve_anchor<F>(
    destination: &Destination,
    page_height: Option<f32>,
    fit_h: F,
) -> Option<Anchor>
where
    F: FnOnce(ObjectRef) -> Result<f32>,
{
    match *destination {
        Destination::Named { xref } => {
            let anchor = page_height
                .ok_or_else(|| Error::Destination(format!("no target page for {:?}", xref)))
                .and_then(|height| Ok((height, fit_h(xref)?)))
                .map(|(height, top)| Anchor::new(-1.0, (height - top).max(0.0)));

            Some(anchor.unwrap_or_else(|e| {
                log::debug!("named destination falls back to title matching: {}", e);
                Anchor::NONE
            }))
        }
        Destination::Goto { x, y } => Some(Anchor::new(x, y)),
        Destination::Other => None,
    }
}

/// Ask the language model for the heading level of each `(title, page)`.
///
/// Replies are paired with `lines` by position. Only entries whose page is
/// all ASCII digits survive; their page is shifted by `offset`.
pub fn assign_levels(
    llm: &dyn LanguageModel,
    prompts: &dyn PromptBuilder,
    lines: &[(String, String)],
    offset: i64,
) -> Result<Vec<OutlineEntry>> {
    let titles: Vec<String> = lines.iter().map(|(title, _)| title.clone()).collect();
    let reply = llm.chat(&prompts.outline_prompt(&titles))?;
    let levels = response::parse_pairs(&reply);

    if levels.len() != lines.len() {
        log::warn!(
            "level reply has {} entries for {} titles",
            levels.len(),
            lines.len()
        );
    }

    let outline = lines
        .iter()
        .zip(levels.iter())
        .filter_map(|((title, page), (_, level))| {
            let Some(level) = response::first_integer(level) else {
                log::debug!("no level for {:?}", title);
                return None;
            };
            if page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let page: i64 = page.parse().ok()?;
            Some(OutlineEntry::new(level, title.clone(), page + offset, Anchor::NONE))
        })
        .collect();

    Ok(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::DefaultPrompts;
    use crate::model::RawOutlineEntry;
    use crate::parser::backend::memory::MemoryBackend;

    struct Reply(&'static str);

    impl LanguageModel for Reply {
        fn chat(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_named_destination_anchor() {
        let anchor = resolve_anchor(&Destination::Named { xref: (7, 0) }, Some(842.0), |_| Ok(742.0));
        assert_eq!(anchor, Some(Anchor::new(-1.0, 100.0)));
    }

    #[test]
    fn test_named_destination_clamps_to_zero() {
        let anchor = resolve_anchor(&Destination::Named { xref: (7, 0) }, Some(500.0), |_| Ok(900.0));
        assert_eq!(anchor, Some(Anchor::new(-1.0, 0.0)));
    }

    #[test]
    fn test_failed_named_destination_is_exactly_sentinel() {
        let failing = resolve_anchor(&Destination::Named { xref: (7, 0) }, Some(842.0), |_| {
            Err(Error::Destination("broken".into()))
        });
        assert_eq!(failing, Some(Anchor::NONE));

        let no_page = resolve_anchor(&Destination::Named { xref: (7, 0) }, None, |_| Ok(10.0));
        assert_eq!(no_page, Some(Anchor::NONE));
    }

    #[test]
    fn test_goto_used_as_is_and_other_dropped() {
        assert_eq!(
            resolve_anchor(&Destination::Goto { x: 72.0, y: 90.0 }, None, |_| Ok(0.0)),
            Some(Anchor::new(72.0, 90.0))
        );
        assert_eq!(resolve_anchor(&Destination::Other, Some(842.0), |_| Ok(0.0)), None);
    }

    #[test]
    fn test_extract_outline_from_backend() {
        let mut backend = MemoryBackend::with_pages(3);
        backend.outline = vec![
            RawOutlineEntry {
                level: 1,
                title: "Intro".into(),
                page: 1,
                destination: Destination::Goto { x: 0.0, y: 50.0 },
            },
            RawOutlineEntry {
                level: 2,
                title: "Named".into(),
                page: 2,
                destination: Destination::Named { xref: (12, 0) },
            },
            RawOutlineEntry {
                level: 2,
                title: "Broken".into(),
                page: 2,
                destination: Destination::Named { xref: (13, 0) },
            },
            RawOutlineEntry {
                level: 1,
                title: "Website".into(),
                page: -1,
                destination: Destination::Other,
            },
        ];
        backend.fit_h.insert((12, 0), 800.0);

        let outline = extract_outline(&backend).unwrap();
        assert_eq!(outline.len(), 3);
        assert_eq!(outline[0], OutlineEntry::new(1, "Intro", 1, Anchor::new(0.0, 50.0)));
        assert_eq!(outline[1].anchor, Anchor::new(-1.0, 42.0));
        assert_eq!(outline[2].anchor, Anchor::NONE);
    }

    #[test]
    fn test_assign_levels_pairs_by_position() {
        let llm = Reply(r#"[["Chapter 1", "1"], ["1.1 Scope", "level 2"], ["Index", "1"]]"#);
        let lines = vec![
            ("Chapter 1".to_string(), "3".to_string()),
            ("1.1 Scope".to_string(), "5".to_string()),
            ("Index".to_string(), "".to_string()),
        ];

        let outline = assign_levels(&llm, &DefaultPrompts, &lines, 10).unwrap();
        assert_eq!(
            outline,
            vec![
                OutlineEntry::new(1, "Chapter 1", 13, Anchor::NONE),
                OutlineEntry::new(2, "1.1 Scope", 15, Anchor::NONE),
            ]
        );
    }

    #[test]
    fn test_assign_levels_skips_non_numeric_pages() {
        let llm = Reply(r#"[["Preface", "1"], ["Body", "1"]]"#);
        let lines = vec![
            ("Preface".to_string(), "iv".to_string()),
            ("Body".to_string(), "1".to_string()),
        ];
        let outline = assign_levels(&llm, &DefaultPrompts, &lines, 0).unwrap();
        assert_eq!(outline, vec![OutlineEntry::new(1, "Body", 1, Anchor::NONE)]);
    }
}
