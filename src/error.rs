//! Error types for pdfoutline.

use std::io;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building bookmarks or resolving content.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading documents or writing crops.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// An outline destination could not be resolved.
    #[error("Outline destination error: {0}")]
    Destination(String),

    /// Error cropping or encoding a raster image.
    #[error("Image error: {0}")]
    Image(String),

    /// An external model (layout, OCR, language, vision) failed.
    #[error("{model} model error: {message}")]
    Model {
        /// Which collaborator failed
        model: &'static str,
        /// Failure description
        message: String,
    },

    /// An operation needs a collaborator that was not configured.
    #[error("No {0} configured")]
    MissingModel(&'static str),

    /// Error during rendering (JSON, text, Markdown).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a model error for the named collaborator.
    pub fn model(model: &'static str, message: impl Into<String>) -> Self {
        Error::Model {
            model,
            message: message.into(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}
