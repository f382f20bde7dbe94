//! Interfaces to the external models the parser depends on.
//!
//! Layout detection, OCR, language and vision-language inference all live
//! outside this crate. Callers implement these traits over whatever engine
//! they run and hand the instances to [`crate::PdfParser`] through
//! [`Models`]. Every call is blocking; timeouts and retries belong to the
//! implementation.

pub mod prompt;
pub mod response;

use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::BBox;
use crate::parser::Rasterizer;

pub use prompt::{DefaultPrompts, PromptBuilder};

/// A block reported by a layout model, in raster coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Block tag: "title", "text", "figure", "table", "header", ...
    pub kind: String,
    pub bbox: BBox,
    /// Text the model already recognized, if any
    pub text: Option<String>,
}

impl LayoutBlock {
    pub fn new(kind: impl Into<String>, bbox: impl Into<BBox>) -> Self {
        Self {
            kind: kind.into(),
            bbox: bbox.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A request to a vision-language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionPrompt {
    /// System-level instruction for this call
    pub instruction: String,
    /// User prompt
    pub text: String,
    /// Images the prompt refers to
    pub images: Vec<PathBuf>,
}

impl VisionPrompt {
    pub fn new(instruction: impl Into<String>, text: impl Into<String>, image: &Path) -> Self {
        Self {
            instruction: instruction.into(),
            text: text.into(),
            images: vec![image.to_path_buf()],
        }
    }
}

/// Page layout detection.
pub trait StructureModel: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<LayoutBlock>>;
}

/// Text recognition over an image file.
pub trait OcrModel: Send + Sync {
    fn recognize(&self, image_path: &Path) -> Result<String>;
}

/// Text-only chat model.
pub trait LanguageModel: Send + Sync {
    fn chat(&self, prompt: &str) -> Result<String>;
}

/// Chat model that also sees images.
pub trait VisionLanguageModel: Send + Sync {
    fn chat(&self, prompt: &VisionPrompt) -> Result<String>;
}

/// The collaborators a parser session uses for page content.
///
/// Rasterizer, layout and OCR models are required. The language model
/// (OCR correction, outline recovery) and the vision model (figure
/// descriptions, catalogue detection) are optional.
pub struct Models {
    pub rasterizer: Box<dyn Rasterizer>,
    pub structure: Box<dyn StructureModel>,
    pub ocr: Box<dyn OcrModel>,
    pub llm: Option<Box<dyn LanguageModel>>,
    pub vlm: Option<Box<dyn VisionLanguageModel>>,
    pub prompts: Box<dyn PromptBuilder>,
}

impl Models {
    pub fn new(
        rasterizer: impl Rasterizer + 'static,
        structure: impl StructureModel + 'static,
        ocr: impl OcrModel + 'static,
    ) -> Self {
        Self {
            rasterizer: Box::new(rasterizer),
            structure: Box::new(structure),
            ocr: Box::new(ocr),
            llm: None,
            vlm: None,
            prompts: Box::new(DefaultPrompts),
        }
    }

    /// Use a language model for OCR correction and outline recovery.
    pub fn with_llm(mut self, llm: impl LanguageModel + 'static) -> Self {
        self.llm = Some(Box::new(llm));
        self
    }

    /// Use a vision-language model for non-text blocks and catalogue detection.
    pub fn with_vlm(mut self, vlm: impl VisionLanguageModel + 'static) -> Self {
        self.vlm = Some(Box::new(vlm));
        self
    }

    /// Replace the default prompts.
    pub fn with_prompts(mut self, prompts: impl PromptBuilder + 'static) -> Self {
        self.prompts = Box::new(prompts);
        self
    }
}

impl std::fmt::Debug for Models {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Models")
            .field("llm", &self.llm.is_some())
            .field("vlm", &self.vlm.is_some())
            .finish_non_exhaustive()
    }
}
