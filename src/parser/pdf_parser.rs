//! PDF parser session.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::inference::{response, Models};
use crate::model::{BookMark, Content, OutlineEntry, Page};

use super::assembler::{render_page, PageAssembler, ZOOM};
use super::backend::{LopdfBackend, PdfBackend};
use super::catalogue;
use super::options::{ErrorMode, ParseOptions};
use super::outline::{assign_levels, extract_outline};
use super::range::resolve_contents;
use super::scratch::ScratchDir;
use super::tree::build_bookmarks;

/// A parser session over one document.
///
/// The outline is read when the session opens. Bookmark trees can be built
/// without any model; page content needs [`Models`] attached with
/// [`PdfParser::with_models`]. Crops are written to a scratch directory that
/// lives as long as the session.
pub struct PdfParser<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ParseOptions,
    outline: Vec<OutlineEntry>,
    models: Option<Models>,
    scratch: ScratchDir,
}

impl PdfParser<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_file(path)?;
        Self::from_lopdf(backend, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data)?;
        Self::from_lopdf(backend, options)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_lopdf(backend: LopdfBackend, options: ParseOptions) -> Result<Self> {
        // lopdf 0.34 cannot decrypt
        if options.password.is_some() && backend.is_encrypted() {
            log::warn!("Password was provided but lopdf 0.34 doesn't support decryption");
        }
        Self::with_backend(backend, options)
    }
}

impl<B: PdfBackend> PdfParser<B> {
    /// Start a session over any backend.
    pub fn with_backend(backend: B, options: ParseOptions) -> Result<Self> {
        let outline = match extract_outline(&backend) {
            Ok(outline) => outline,
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to read outline, continuing without one: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            backend,
            options,
            outline,
            models: None,
            scratch: ScratchDir::new()?,
        })
    }

    /// Attach the models used for page content.
    pub fn with_models(mut self, models: Models) -> Self {
        self.models = Some(models);
        self
    }

    pub fn set_models(&mut self, models: Models) {
        self.models = Some(models);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Path of the session's scratch directory.
    pub fn scratch_path(&self) -> Result<&Path> {
        self.scratch.path()
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// The current outline, as read from the document or set afterwards.
    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    /// Replace the outline.
    pub fn set_outline(&mut self, outline: Vec<OutlineEntry>) {
        self.outline = outline;
    }

    /// Build the bookmark forest from the current outline.
    pub fn bookmarks(&self) -> Vec<BookMark> {
        build_bookmarks(&self.outline, self.page_count())
    }

    /// Assemble the content of the zero-based page `page_index`.
    pub fn page(&self, page_index: usize) -> Result<Page> {
        let models = self.models()?;
        self.check_page(page_index)?;
        PageAssembler::new(&self.backend, models, &self.scratch).assemble(page_index)
    }

    /// The content owned by `bookmark`, trimmed at both ends.
    pub fn contents(&self, bookmark: &BookMark) -> Result<Vec<Content>> {
        self.models()?;
        resolve_contents(bookmark, |index| self.load_page(index).map(|page| page.contents))
    }

    /// Find the table-of-contents pages among the leading pages.
    ///
    /// Returns zero-based `(first, last)` page indices, or `None` when no
    /// sampled page looks like a catalogue.
    pub fn locate_catalogue(&self) -> Result<Option<(usize, usize)>> {
        let models = self.models()?;
        let vlm = models
            .vlm
            .as_deref()
            .ok_or(Error::MissingModel("vision-language model"))?;

        catalogue::locate_catalogue(
            models.rasterizer.as_ref(),
            vlm,
            models.prompts.as_ref(),
            &self.scratch,
            self.page_count(),
            self.options.catalogue_rate,
        )
    }

    /// Replace the outline with one read from catalogue pages `start..=end`.
    ///
    /// Catalogue page numbers are shifted by `offset` to become document
    /// page numbers.
    pub fn set_outline_by_catalogue(&mut self, start: usize, end: usize, offset: i64) -> Result<()> {
        let models = self.models()?;
        let llm = models
            .llm
            .as_deref()
            .ok_or(Error::MissingModel("language model"))?;

        let mut lines = Vec::new();
        for index in start..=end {
            self.check_page(index)?;
            let text = match self.backend.page_text(index) {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => self.layout_text(index)?,
                Err(e) => {
                    log::debug!("page {} has no embedded text: {}", index + 1, e);
                    self.layout_text(index)?
                }
            };
            let reply = llm.chat(&models.prompts.directory_prompt(&text))?;
            lines.extend(response::parse_pairs(&reply));
        }

        log::info!("catalogue pages {}..={} list {} entries", start, end, lines.len());
        let outline = assign_levels(llm, models.prompts.as_ref(), &lines, offset)?;
        self.outline = outline;
        Ok(())
    }

    /// Replace the outline with the titles the layout model finds on every page.
    pub fn set_outline_auto(&mut self) -> Result<()> {
        let models = self.models()?;
        let llm = models
            .llm
            .as_deref()
            .ok_or(Error::MissingModel("language model"))?;

        let mut titles = Vec::new();
        for index in 0..self.page_count() {
            let raster = render_page(models.rasterizer.as_ref(), index, 1.0)?;
            for block in models.structure.detect(&raster.image)? {
                match block.text {
                    Some(text) if block.kind == "title" && !text.is_empty() => {
                        titles.push((text, (index + 1).to_string()));
                    }
                    _ => {}
                }
            }
        }

        log::info!("found {} titles across {} pages", titles.len(), self.page_count());
        let outline = assign_levels(llm, models.prompts.as_ref(), &titles, 0)?;
        self.outline = outline;
        Ok(())
    }

    /// Remove the scratch directory now instead of on drop.
    pub fn close(self) -> Result<()> {
        let mut scratch = self.scratch;
        scratch.close()
    }

    fn models(&self) -> Result<&Models> {
        self.models
            .as_ref()
            .ok_or(Error::MissingModel("page models"))
    }

    fn check_page(&self, page_index: usize) -> Result<()> {
        let count = self.page_count();
        if page_index >= count {
            return Err(Error::PageOutOfRange(page_index, count));
        }
        Ok(())
    }

    /// Text of every layout block on a page, one block per line.
    fn layout_text(&self, page_index: usize) -> Result<String> {
        let models = self.models()?;
        let raster = render_page(models.rasterizer.as_ref(), page_index, ZOOM)?;
        let blocks = models.structure.detect(&raster.image)?;
        Ok(blocks
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// A page, or an empty page in lenient mode when assembly fails.
    fn load_page(&self, page_index: usize) -> Result<Page> {
        match self.page(page_index) {
            Ok(page) => Ok(page),
            Err(e @ Error::MissingModel(_)) => Err(e),
            Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to assemble page {}: {}", page_index + 1, e);
                Ok(Page::new(page_index + 1, Vec::new()))
            }
            Err(e) => Err(e),
        }
    }
}

impl<B: PdfBackend + Sync> PdfParser<B> {
    /// Assemble every page in order.
    pub fn pages(&self) -> Result<Vec<Page>> {
        self.models()?;
        let count = self.page_count();

        if self.options.parallel {
            (0..count)
                .into_par_iter()
                .map(|index| self.load_page(index))
                .collect()
        } else {
            (0..count).map(|index| self.load_page(index)).collect()
        }
    }
}

impl<B: PdfBackend> std::fmt::Debug for PdfParser<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfParser")
            .field("pages", &self.page_count())
            .field("outline_entries", &self.outline.len())
            .field("options", &self.options)
            .field("models", &self.models)
            .finish()
    }
}
