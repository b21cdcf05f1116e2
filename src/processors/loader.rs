// comic-tool/src/processors/loader.rs
use crate::core::{ComicToolError, Result};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::{Path, PathBuf};

/// A decoded page. Dimensions are captured at open time and never re-read.
pub struct PageImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

impl PageImage {
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((100_000, 100_000)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    pub fn open(&self, path: &Path) -> Result<PageImage> {
        log::debug!("Loading page from: {}", path.display());

        self.validate_path(path)?;

        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let (width, height) = image.dimensions();

        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(ComicToolError::InvalidParameter(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        log::debug!("Loaded page: {}x{} pixels", width, height);

        Ok(PageImage {
            path: path.to_path_buf(),
            width,
            height,
            image,
        })
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(ComicToolError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_dimensions_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.png");
        image::RgbImage::new(30, 40).save(&path).unwrap();

        let page = Loader::new().open(&path).unwrap();
        assert_eq!((page.width, page.height), (30, 40));
        assert!(page.is_portrait());
    }

    #[test]
    fn rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(Loader::new().open(&path).is_err());
    }

    #[test]
    fn rejects_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            Loader::new().open(&path),
            Err(ComicToolError::InvalidParameter(_))
        ));
    }

    #[test]
    fn enforces_max_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.png");
        image::RgbImage::new(20, 10).save(&path).unwrap();
        assert!(Loader::new().with_max_dimensions(10, 10).open(&path).is_err());
    }
}
