// comic-tool/src/processors/encoder.rs
use crate::core::{ComicToolError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes cropped page halves back to disk in the source page's format.
pub struct Encoder {
    quality: u8,
}

impl Encoder {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn save(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let format = self.detect_format(path)?;

        log::debug!(
            "Saving page to {} with format {:?}, quality: {}",
            path.display(),
            format,
            self.quality
        );

        match format {
            ImageFormat::Jpeg => self.save_jpeg(image, path),
            _ => {
                image.save_with_format(path, format)?;
                Ok(())
            }
        }
    }

    fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(writer, self.quality);
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        Ok(())
    }

    fn detect_format(&self, path: &Path) -> Result<ImageFormat> {
        ImageFormat::from_path(path).map_err(|_| {
            ComicToolError::UnsupportedFormat(format!(
                "Cannot encode page: {}",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clamps_quality() {
        assert_eq!(Encoder::new(0).quality(), 1);
        assert_eq!(Encoder::new(255).quality(), 100);
    }

    #[test]
    fn saves_in_format_of_extension() {
        let dir = TempDir::new().unwrap();
        let image = DynamicImage::new_rgb8(8, 6);
        let encoder = Encoder::new(90);

        for name in ["a.jpg", "b.png", "c.gif"] {
            let path = dir.path().join(name);
            encoder.save(&image, &path).unwrap();
            let reread = image::open(&path).unwrap();
            assert_eq!((reread.width(), reread.height()), (8, 6));
        }
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let image = DynamicImage::new_rgb8(2, 2);
        let result = Encoder::new(90).save(&image, &dir.path().join("x.unknown"));
        assert!(matches!(result, Err(ComicToolError::UnsupportedFormat(_))));
    }
}
