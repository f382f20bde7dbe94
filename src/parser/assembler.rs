//! Page content assembly.
//!
//! A page is rasterized, split into blocks by the layout model, and each
//! block gets its text from the cheapest source that works: text the layout
//! model already recognized, embedded PDF text, OCR over a crop, or a
//! vision-language description for non-text blocks.

use image::{imageops, RgbImage};

use crate::error::Result;
use crate::inference::{LayoutBlock, Models};
use crate::model::{BBox, Content, ContentType, Page};

use super::backend::{PdfBackend, Rasterizer};
use super::scratch::ScratchDir;

/// Zoom used to render pages for layout detection.
pub const ZOOM: f32 = 2.0;

/// Renders wider or taller than this fall back to zoom 1.
pub const MAX_RASTER_SIDE: u32 = 2000;

/// Pixels added around a block before cropping.
pub const CROP_MARGIN: f32 = 20.0;

/// Crops narrower or shorter than this are skipped.
pub const MIN_CROP_SIDE: f32 = 5.0;

/// Figure crops narrower or shorter than this are skipped.
pub const MIN_FIGURE_SIDE: f32 = 150.0;

const SKIPPED_KINDS: [&str; 3] = ["header", "footer", "reference"];

/// A page raster and the zoom it was actually rendered at.
#[derive(Debug, Clone)]
pub struct Raster {
    pub image: RgbImage,
    pub zoom: f32,
}

/// Render a page at `zoom`, falling back to zoom 1 for oversized pages.
pub fn render_page(rasterizer: &dyn Rasterizer, page_index: usize, zoom: f32) -> Result<Raster> {
    let image = rasterizer.rasterize(page_index, zoom)?;
    if zoom != 1.0 && (image.width() > MAX_RASTER_SIDE || image.height() > MAX_RASTER_SIDE) {
        log::debug!(
            "page {} renders at {}x{}, falling back to zoom 1",
            page_index,
            image.width(),
            image.height()
        );
        let image = rasterizer.rasterize(page_index, 1.0)?;
        return Ok(Raster { image, zoom: 1.0 });
    }
    Ok(Raster { image, zoom })
}

/// Crop a block out of the raster with a margin, clipped to the image.
///
/// Returns `None` when the clipped region is too small to be useful.
pub fn crop_block(image: &RgbImage, bbox: &BBox, kind: &str) -> Option<RgbImage> {
    let (width, height) = (image.width() as f32, image.height() as f32);
    let x1 = (bbox.x1 - CROP_MARGIN).max(0.0).floor();
    let y1 = (bbox.y1 - CROP_MARGIN).max(0.0).floor();
    let x2 = (bbox.x2 + CROP_MARGIN).min(width).ceil();
    let y2 = (bbox.y2 + CROP_MARGIN).min(height).ceil();

    if x2 - x1 < MIN_CROP_SIDE || y2 - y1 < MIN_CROP_SIDE {
        return None;
    }
    if kind == "figure" && (x2 - x1 < MIN_FIGURE_SIDE || y2 - y1 < MIN_FIGURE_SIDE) {
        return None;
    }

    let view = imageops::crop_imm(
        image,
        x1 as u32,
        y1 as u32,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
    );
    Some(view.to_image())
}

/// Embedded text is usable when non-empty and free of replacement characters.
pub fn is_usable_text(text: &str) -> bool {
    !text.is_empty() && !text.contains('\u{FFFD}')
}

/// Builds [`Page`]s from a backend, the session's models and its scratch space.
pub struct PageAssembler<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    models: &'a Models,
    scratch: &'a ScratchDir,
}

impl<'a, B: PdfBackend + ?Sized> PageAssembler<'a, B> {
    pub fn new(backend: &'a B, models: &'a Models, scratch: &'a ScratchDir) -> Self {
        Self {
            backend,
            models,
            scratch,
        }
    }

    /// Assemble the content of the zero-based page `page_index`.
    pub fn assemble(&self, page_index: usize) -> Result<Page> {
        let raster = render_page(self.models.rasterizer.as_ref(), page_index, ZOOM)?;
        let blocks = self.models.structure.detect(&raster.image)?;
        log::debug!("page {}: {} layout blocks", page_index + 1, blocks.len());

        let mut contents = Vec::with_capacity(blocks.len());
        for block in blocks {
            if SKIPPED_KINDS.contains(&block.kind.as_str()) {
                continue;
            }

            let text = match block.kind.as_str() {
                "title" | "text" => self.block_text(page_index, &raster, &block)?,
                _ => self.describe_block(&raster, &block)?,
            };

            if let Some(text) = text.filter(|t| !t.is_empty()) {
                let kind = if block.kind == "title" {
                    ContentType::Title
                } else {
                    ContentType::Text
                };
                contents.push(Content::new(
                    kind,
                    text,
                    block.bbox.scaled_down(raster.zoom),
                    block.kind,
                ));
            }
        }

        Ok(Page::new(page_index + 1, contents))
    }

    /// Text for a `title` or `text` block.
    fn block_text(&self, page_index: usize, raster: &Raster, block: &LayoutBlock) -> Result<Option<String>> {
        if let Some(text) = &block.text {
            return Ok(Some(text.clone()));
        }

        let rect = block.bbox.scaled_down(raster.zoom);
        match self.backend.text_in_rect(page_index, rect) {
            Ok(native) if is_usable_text(&native) => return Ok(Some(native)),
            Ok(_) => {}
            Err(e) => log::debug!("page {}: no embedded text ({}), using OCR", page_index + 1, e),
        }

        let Some(crop) = crop_block(&raster.image, &block.bbox, &block.kind) else {
            return Ok(None);
        };
        let path = self.scratch.save_png(&crop)?;
        let recognized = self.models.ocr.recognize(&path)?;
        Ok(Some(self.correct(recognized)))
    }

    /// Best-effort OCR correction; the raw text is kept on any failure.
    fn correct(&self, recognized: String) -> String {
        let Some(llm) = self.models.llm.as_deref() else {
            return recognized;
        };
        match llm.chat(&self.models.prompts.ocr_aided_prompt(&recognized)) {
            Ok(corrected) => corrected,
            Err(e) => {
                log::warn!("OCR correction failed, keeping raw text: {}", e);
                recognized
            }
        }
    }

    /// Description of a figure, table or other non-text block.
    fn describe_block(&self, raster: &Raster, block: &LayoutBlock) -> Result<Option<String>> {
        let Some(vlm) = self.models.vlm.as_deref() else {
            return Ok(None);
        };
        let Some(crop) = crop_block(&raster.image, &block.bbox, &block.kind) else {
            return Ok(None);
        };
        let path = self.scratch.save_png(&crop)?;
        vlm.chat(&self.models.prompts.ocr_prompt(&path)).map(Some)
    }
}
