//! Prompt construction for the language and vision models.

use std::path::Path;

use super::VisionPrompt;

/// Builds every prompt the parser sends to a model.
///
/// Replies are parsed with [`super::response::parse_pairs`], so prompts that
/// ask for lists must ask for a JSON-style list of two-element lists.
pub trait PromptBuilder: Send + Sync {
    /// Ask whether a page image is a table-of-contents page.
    fn catalogue_prompt(&self, image: &Path) -> VisionPrompt;

    /// Ask for a description of a non-text block (figure, table, formula).
    fn ocr_prompt(&self, image: &Path) -> VisionPrompt;

    /// Ask for `[["title", "page"], ...]` from the text of a catalogue page.
    fn directory_prompt(&self, text: &str) -> String;

    /// Ask for `[["title", "level"], ...]` for a list of section titles.
    fn outline_prompt(&self, titles: &[String]) -> String;

    /// Ask for a corrected version of raw OCR output.
    fn ocr_aided_prompt(&self, text: &str) -> String;
}

/// Built-in English prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrompts;

impl PromptBuilder for DefaultPrompts {
    fn catalogue_prompt(&self, image: &Path) -> VisionPrompt {
        VisionPrompt::new(
            "You classify scanned book and course pages.",
            "Is this page a table of contents (a list of section titles with page numbers)? \
             Answer with a single word: yes or no.",
            image,
        )
    }

    fn ocr_prompt(&self, image: &Path) -> VisionPrompt {
        VisionPrompt::new(
            "You transcribe and describe regions cropped from document pages.",
            "Describe the content of this image. Transcribe any text, formula or table \
             faithfully. Reply with the description only.",
            image,
        )
    }

    fn directory_prompt(&self, text: &str) -> String {
        format!(
            "The following text was taken from a table of contents page.\n\
             Extract every entry as a title and the page number it points to.\n\
             Reply only with a list in the form [[\"title\", \"page\"], ...]. \
             Keep titles exactly as written. Use \"\" when an entry has no page number.\n\n\
             {}",
            text
        )
    }

    fn outline_prompt(&self, titles: &[String]) -> String {
        let listed = titles
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "These are section titles of one document, in reading order.\n\
             Assign each title its heading level, 1 for chapters, 2 for sections, and so on.\n\
             Reply only with a list in the form [[\"title\", \"level\"], ...], \
             one entry per title and in the same order.\n\n\
             {}",
            listed
        )
    }

    fn ocr_aided_prompt(&self, text: &str) -> String {
        format!(
            "The following text came from OCR and may contain recognition errors.\n\
             Correct obvious character errors without rewording, adding or removing content.\n\
             Reply with the corrected text only.\n\n\
             {}",
            text
        )
    }
}
