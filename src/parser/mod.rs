//! PDF parsing module.
//!
//! Outline entries flow through [`outline`] into [`tree`]; page content is
//! built by [`assembler`] and sliced per bookmark by [`range`].

pub mod assembler;
pub mod backend;
pub mod catalogue;
mod options;
pub mod outline;
mod pdf_parser;
pub mod range;
mod scratch;
pub mod tree;

pub use assembler::{PageAssembler, Raster};
pub use backend::{LopdfBackend, PdfBackend, Rasterizer};
pub use catalogue::longest_consecutive_run;
pub use options::{ErrorMode, ParseOptions, DEFAULT_CATALOGUE_RATE};
pub use outline::extract_outline;
pub use pdf_parser::PdfParser;
pub use range::resolve_contents;
pub use scratch::ScratchDir;
pub use tree::build_bookmarks;
