//! Per-session scratch directory for page renders and crops.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tempfile::TempDir;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A temporary directory owned by one parser session.
///
/// Removed on drop, or explicitly through [`ScratchDir::close`].
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
}

impl ScratchDir {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("pdfoutline-").tempdir()?;
        log::debug!("scratch directory at {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> Result<&Path> {
        self.dir
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| Error::Other("scratch directory already closed".to_string()))
    }

    /// Write `image` as a PNG under a fresh name and return its path.
    pub fn save_png(&self, image: &RgbImage) -> Result<PathBuf> {
        let path = self
            .path()?
            .join(format!("{}.png", Uuid::new_v4().simple()));
        image.save_with_format(&path, image::ImageFormat::Png)?;
        Ok(path)
    }

    pub fn is_closed(&self) -> bool {
        self.dir.is_none()
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(&mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => Ok(dir.close()?),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_close() {
        let mut scratch = ScratchDir::new().unwrap();
        let root = scratch.path().unwrap().to_path_buf();

        let saved = scratch.save_png(&RgbImage::new(4, 3)).unwrap();
        assert!(saved.starts_with(&root));
        assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(saved.exists());

        scratch.close().unwrap();
        assert!(scratch.is_closed());
        assert!(!root.exists());
        assert!(scratch.save_png(&RgbImage::new(1, 1)).is_err());
        // closing twice is fine
        scratch.close().unwrap();
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = {
            let scratch = ScratchDir::new().unwrap();
            scratch.path().unwrap().to_path_buf()
        };
        assert!(!root.exists());
    }
}
