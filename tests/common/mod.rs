//! Mock backend and models shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use pdfoutline::error::{Error, Result};
use pdfoutline::model::ObjectRef;
use pdfoutline::{
    BBox, LanguageModel, LayoutBlock, Models, OcrModel, PdfBackend, Rasterizer, RawOutlineEntry,
    StructureModel, VisionLanguageModel, VisionPrompt,
};

/// An in-memory document: page sizes, outline, and text placed in boxes.
#[derive(Default)]
pub struct MockBackend {
    pub sizes: Vec<(f32, f32)>,
    pub outline: Vec<RawOutlineEntry>,
    pub fit_h: HashMap<ObjectRef, f32>,
    /// Embedded text per page, in document space
    pub boxes: HashMap<usize, Vec<(BBox, String)>>,
    pub texts: HashMap<usize, String>,
}

impl MockBackend {
    pub fn with_pages(count: usize) -> Self {
        Self {
            sizes: vec![(595.0, 842.0); count],
            ..Default::default()
        }
    }

    pub fn place(&mut self, page: usize, bbox: [f32; 4], text: &str) {
        self.boxes
            .entry(page)
            .or_default()
            .push((BBox::from(bbox), text.to_string()));
    }
}

impl PdfBackend for MockBackend {
    fn page_count(&self) -> usize {
        self.sizes.len()
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        self.sizes
            .get(page_index)
            .copied()
            .ok_or(Error::PageOutOfRange(page_index, self.sizes.len()))
    }

    fn outline_entries(&self) -> Result<Vec<RawOutlineEntry>> {
        Ok(self.outline.clone())
    }

    fn resolve_fit_h(&self, xref: ObjectRef) -> Result<f32> {
        self.fit_h
            .get(&xref)
            .copied()
            .ok_or_else(|| Error::Destination(format!("{:?} unresolved", xref)))
    }

    fn text_in_rect(&self, page_index: usize, rect: BBox) -> Result<String> {
        Ok(self
            .boxes
            .get(&page_index)
            .into_iter()
            .flatten()
            .filter(|(b, _)| rect.contains((b.x1 + b.x2) / 2.0, (b.y1 + b.y2) / 2.0))
            .map(|(_, text)| text.as_str())
            .collect())
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        Ok(self.texts.get(&page_index).cloned().unwrap_or_default())
    }
}

/// Renders blank pages whose first pixel encodes the page index.
pub struct MarkedRasterizer {
    pub size: (u32, u32),
}

impl MarkedRasterizer {
    pub fn a4() -> Self {
        Self { size: (595, 842) }
    }
}

impl Rasterizer for MarkedRasterizer {
    fn rasterize(&self, page_index: usize, zoom: f32) -> Result<RgbImage> {
        let width = (self.size.0 as f32 * zoom) as u32;
        let height = (self.size.1 as f32 * zoom) as u32;
        let mut image = RgbImage::new(width, height);
        image.put_pixel(0, 0, Rgb([page_index as u8, 0, 0]));
        Ok(image)
    }
}

/// Page index encoded by [`MarkedRasterizer`].
pub fn page_of(image: &RgbImage) -> usize {
    image.get_pixel(0, 0)[0] as usize
}

/// Layout model returning fixed blocks (raster space) per page.
#[derive(Default)]
pub struct ScriptedLayout {
    pub blocks: HashMap<usize, Vec<LayoutBlock>>,
}

impl ScriptedLayout {
    pub fn add(&mut self, page: usize, block: LayoutBlock) {
        self.blocks.entry(page).or_default().push(block);
    }
}

impl StructureModel for ScriptedLayout {
    fn detect(&self, image: &RgbImage) -> Result<Vec<LayoutBlock>> {
        Ok(self.blocks.get(&page_of(image)).cloned().unwrap_or_default())
    }
}

/// OCR model that records every image it is given.
#[derive(Clone, Default)]
pub struct RecordingOcr {
    pub reply: Option<String>,
    pub seen: Arc<Mutex<Vec<(PathBuf, bool)>>>,
}

impl RecordingOcr {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Whether every image existed on disk when it was recognized.
    pub fn all_existed(&self) -> bool {
        self.seen.lock().unwrap().iter().all(|(_, existed)| *existed)
    }
}

impl OcrModel for RecordingOcr {
    fn recognize(&self, image_path: &Path) -> Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), image_path.exists()));
        self.reply
            .clone()
            .ok_or_else(|| Error::model("OCR", "engine unavailable"))
    }
}

/// Language model answering by prompt substring, recording every prompt.
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    pub rules: Vec<(&'static str, String)>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub fn rule(mut self, needle: &'static str, reply: &str) -> Self {
        self.rules.push((needle, reply.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl LanguageModel for ScriptedLlm {
    fn chat(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| Error::model("language", "no scripted reply"))
    }
}

/// Language model that always fails.
pub struct FailingLlm;

impl LanguageModel for FailingLlm {
    fn chat(&self, _prompt: &str) -> Result<String> {
        Err(Error::model("language", "timeout"))
    }
}

/// Vision model that answers catalogue questions from the rendered page and
/// describes everything else with a fixed text.
#[derive(Clone, Default)]
pub struct ScriptedVlm {
    pub catalogue_pages: HashSet<usize>,
    pub description: String,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedVlm {
    pub fn describing(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Default::default()
        }
    }

    pub fn catalogue(pages: &[usize]) -> Self {
        Self {
            catalogue_pages: pages.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VisionLanguageModel for ScriptedVlm {
    fn chat(&self, prompt: &VisionPrompt) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.text.contains("table of contents") {
            let image = image::open(&prompt.images[0])
                .map_err(|e| Error::model("vision", e.to_string()))?
                .to_rgb8();
            let answer = if self.catalogue_pages.contains(&page_of(&image)) {
                "是"
            } else {
                "否"
            };
            return Ok(answer.to_string());
        }
        Ok(self.description.clone())
    }
}

/// Models with an A4 rasterizer and the given layout and OCR.
pub fn models(layout: ScriptedLayout, ocr: RecordingOcr) -> Models {
    Models::new(MarkedRasterizer::a4(), layout, ocr)
}
