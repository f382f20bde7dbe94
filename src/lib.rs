//! # pdfoutline
//!
//! Turns a PDF's outline into a navigable bookmark tree and resolves the
//! exact content each bookmark owns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{read_bookmarks, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let bookmarks = read_bookmarks("course.pdf")?;
//!     print!("{}", render::to_outline_text(&bookmarks));
//!     Ok(())
//! }
//! ```
//!
//! Building the tree only needs the document. Resolving content needs a
//! rasterizer, a layout model and an OCR model, plus optional language and
//! vision-language models, supplied as [`inference::Models`]:
//!
//! ```ignore
//! use pdfoutline::{inference::Models, PdfParser};
//!
//! let parser = PdfParser::open("course.pdf")?
//!     .with_models(Models::new(my_rasterizer, my_layout_model, my_ocr).with_llm(my_llm));
//! for bookmark in parser.bookmarks() {
//!     let contents = parser.contents(&bookmark)?;
//!     println!("{}: {} items", bookmark.title, contents.len());
//! }
//! parser.close()?;
//! ```
//!
//! ## Features
//!
//! - **Outline normalization**: direct and named destinations resolved to page anchors
//! - **Tree building**: nesting from declared levels, contiguous page extents
//! - **Content ranges**: start and end pages trimmed by anchor or title
//! - **Outline recovery**: from catalogue pages or detected titles when a PDF has no outline
//! - **Parallel processing**: optional Rayon fan-out over pages

pub mod detect;
pub mod error;
pub mod inference;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{is_pdf_bytes, pdf_version, pdf_version_of_file};
pub use error::{Error, Result};
pub use inference::{
    LanguageModel, LayoutBlock, Models, OcrModel, StructureModel, VisionLanguageModel,
    VisionPrompt,
};
pub use model::{
    Anchor, BBox, BookMark, BoundaryStrategy, Content, ContentType, Destination, OutlineEntry,
    Page, PageIndex, RawOutlineEntry, ResourceRef,
};
pub use parser::{ErrorMode, LopdfBackend, ParseOptions, PdfBackend, PdfParser, Rasterizer};
pub use render::{JsonFormat, RenderOptions};

use std::path::Path;

/// Read the normalized outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// let outline = pdfoutline::read_outline("course.pdf").unwrap();
/// for entry in &outline {
///     println!("{} {} (p. {})", entry.level, entry.title, entry.page);
/// }
/// ```
pub fn read_outline<P: AsRef<Path>>(path: P) -> Result<Vec<OutlineEntry>> {
    let parser = PdfParser::open(path)?;
    Ok(parser.outline().to_vec())
}

/// Build the bookmark tree of a PDF file.
///
/// # Arguments
///
/// * `path` - Path to the PDF file
///
/// # Example
///
/// ```no_run
/// use pdfoutline::read_bookmarks;
///
/// let bookmarks = read_bookmarks("course.pdf").unwrap();
/// println!("{} chapters", bookmarks.len());
/// ```
pub fn read_bookmarks<P: AsRef<Path>>(path: P) -> Result<Vec<BookMark>> {
    read_bookmarks_with_options(path, ParseOptions::default())
}

/// Build the bookmark tree of a PDF file with custom options.
pub fn read_bookmarks_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<Vec<BookMark>> {
    let parser = PdfParser::open_with_options(path, options)?;
    Ok(parser.bookmarks())
}

/// Build the bookmark tree of an in-memory PDF.
pub fn read_bookmarks_bytes(data: &[u8]) -> Result<Vec<BookMark>> {
    let parser = PdfParser::from_bytes(data)?;
    Ok(parser.bookmarks())
}

/// Convert a PDF's bookmark tree to JSON.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{to_json, JsonFormat};
///
/// let json = to_json("course.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("bookmarks.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let bookmarks = read_bookmarks(path)?;
    render::to_json(&bookmarks, format)
}

/// Render a PDF's bookmark tree as indented text.
pub fn to_outline_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let bookmarks = read_bookmarks(path)?;
    Ok(render::to_outline_text(&bookmarks))
}
