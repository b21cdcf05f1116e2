// comic-tool/src/processors/splitter.rs
//! Spread splitting.
//!
//! Portrait pages are copied through untouched. Anything at least as wide as
//! it is tall is treated as a two-page spread and cut down the middle. The
//! right half is written as `{base}_1L{ext}` and the left half as
//! `{base}_0R{ext}`: readers sort these names lexically and must see the right
//! half first, as in right-to-left material.

use crate::core::{ComicToolError, ProcessMode, Result};
use crate::processors::{Encoder, Loader, PageImage};
use crate::reporter::{ProgressMarker, Reporter};
use crate::utils::{dotted_extension, file_stem_lossy};
use std::path::{Path, PathBuf};

pub const RIGHT_HALF_SUFFIX: &str = "_1L";
pub const LEFT_HALF_SUFFIX: &str = "_0R";

pub struct Splitter {
    mode: ProcessMode,
    loader: Loader,
    encoder: Encoder,
}

impl Splitter {
    pub fn new(mode: ProcessMode, jpeg_quality: u8) -> Self {
        Self {
            mode,
            loader: Loader::new(),
            encoder: Encoder::new(jpeg_quality),
        }
    }

    /// Handles every page independently and returns how many were attempted.
    ///
    /// A page that cannot be decoded or encoded is reported and skipped; a
    /// filesystem failure while writing into `dest_dir` is returned.
    pub fn split_or_copy(
        &self,
        image_paths: &[PathBuf],
        dest_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<usize> {
        for path in image_paths {
            match self.mode {
                ProcessMode::Copy => {
                    copy_page(path, dest_dir)?;
                    reporter.progress(ProgressMarker::Copied);
                }
                ProcessMode::Split => self.split_page(path, dest_dir, reporter)?,
            }
        }
        reporter.finish_progress();

        Ok(image_paths.len())
    }

    fn split_page(&self, path: &Path, dest_dir: &Path, reporter: &dyn Reporter) -> Result<()> {
        let page = match self.loader.open(path) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Skipping unreadable page {}: {}", path.display(), e);
                reporter.error(&format!("{} open Error: {}", path.display(), e));
                reporter.progress(ProgressMarker::Skipped);
                return Ok(());
            }
        };

        if page.is_portrait() {
            copy_page(path, dest_dir)?;
            reporter.progress(ProgressMarker::Copied);
            return Ok(());
        }

        // A one pixel wide spread has no left half to cut.
        if page.width < 2 {
            log::warn!("Page too narrow to split, copying {}", path.display());
            copy_page(path, dest_dir)?;
            reporter.progress(ProgressMarker::Copied);
            return Ok(());
        }

        match self.write_halves(&page, dest_dir) {
            Ok((right_path, left_path)) => {
                log::info!(
                    ">   {} -> {}, {}",
                    path.display(),
                    right_path.display(),
                    left_path.display()
                );
                reporter.progress(ProgressMarker::Split);
                Ok(())
            }
            Err(e @ ComicToolError::Io(_)) => Err(e),
            Err(e) => {
                log::warn!("Skipping page that could not be written {}: {}", path.display(), e);
                reporter.error(&format!("{} save Error: {}", path.display(), e));
                reporter.progress(ProgressMarker::Skipped);
                self.remove_halves(&page, dest_dir);
                Ok(())
            }
        }
    }

    fn half_paths(page: &PageImage, dest_dir: &Path) -> (PathBuf, PathBuf) {
        let base = file_stem_lossy(&page.path);
        let ext = dotted_extension(&page.path);
        (
            dest_dir.join(format!("{}{}{}", base, RIGHT_HALF_SUFFIX, ext)),
            dest_dir.join(format!("{}{}{}", base, LEFT_HALF_SUFFIX, ext)),
        )
    }

    /// Drops whatever half made it to disk before an encode failure.
    fn remove_halves(&self, page: &PageImage, dest_dir: &Path) {
        let (right_path, left_path) = Self::half_paths(page, dest_dir);
        for half in [right_path, left_path] {
            if half.exists() {
                if let Err(e) = std::fs::remove_file(&half) {
                    log::warn!("Could not remove partial page {}: {}", half.display(), e);
                }
            }
        }
    }

    fn write_halves(&self, page: &PageImage, dest_dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let half_width = page.width / 2;
        let left = page.image.crop_imm(0, 0, half_width, page.height);
        let right = page
            .image
            .crop_imm(half_width, 0, page.width - half_width, page.height);

        let (right_path, left_path) = Self::half_paths(page, dest_dir);

        self.encoder.save(&right, &right_path)?;
        self.encoder.save(&left, &left_path)?;

        Ok((right_path, left_path))
    }
}

fn copy_page(path: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().unwrap_or(path.as_os_str());
    let dest = dest_dir.join(file_name);
    std::fs::copy(path, &dest)?;
    log::debug!(">   {} -> {}", path.display(), dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::testing::RecordingReporter;
    use image::{GenericImageView, Rgb, RgbImage};
    use tempfile::TempDir;

    fn two_tone(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        })
    }

    #[test]
    fn portrait_is_copied_byte_for_byte() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let page = src.path().join("p1.png");
        RgbImage::new(10, 20).save(&page).unwrap();

        let reporter = RecordingReporter::default();
        let count = Splitter::new(ProcessMode::Split, 90)
            .split_or_copy(&[page.clone()], dest.path(), &reporter)
            .unwrap();

        assert_eq!(count, 1);
        let copied = dest.path().join("p1.png");
        assert_eq!(std::fs::read(&page).unwrap(), std::fs::read(&copied).unwrap());
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 1);
        assert_eq!(*reporter.markers.borrow(), vec![ProgressMarker::Copied]);
    }

    #[test]
    fn odd_width_spread_splits_with_floor() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let page = src.path().join("spread.png");
        two_tone(21, 10).save(&page).unwrap();

        Splitter::new(ProcessMode::Split, 90)
            .split_or_copy(&[page], dest.path(), &RecordingReporter::default())
            .unwrap();

        let left = image::open(dest.path().join("spread_0R.png")).unwrap();
        let right = image::open(dest.path().join("spread_1L.png")).unwrap();
        assert_eq!(left.dimensions(), (10, 10));
        assert_eq!(right.dimensions(), (11, 10));
        // Left half is red, right half starts at the blue boundary.
        assert_eq!(left.to_rgb8().get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(right.to_rgb8().get_pixel(10, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn square_counts_as_spread() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let page = src.path().join("sq.png");
        RgbImage::new(8, 8).save(&page).unwrap();

        Splitter::new(ProcessMode::Split, 90)
            .split_or_copy(&[page], dest.path(), &RecordingReporter::default())
            .unwrap();

        assert!(dest.path().join("sq_1L.png").exists());
        assert!(dest.path().join("sq_0R.png").exists());
    }

    #[test]
    fn unreadable_page_is_skipped_not_fatal() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let broken = src.path().join("broken.jpg");
        std::fs::write(&broken, b"garbage").unwrap();
        let good = src.path().join("good.png");
        RgbImage::new(4, 8).save(&good).unwrap();

        let reporter = RecordingReporter::default();
        let count = Splitter::new(ProcessMode::Split, 90)
            .split_or_copy(&[broken, good], dest.path(), &reporter)
            .unwrap();

        assert_eq!(count, 2);
        assert!(dest.path().join("good.png").exists());
        assert!(!dest.path().join("broken.jpg").exists());
        assert_eq!(reporter.errors.borrow().len(), 1);
    }

    #[test]
    fn one_pixel_page_does_not_abort_batch() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let dot = src.path().join("dot.png");
        RgbImage::new(1, 1).save(&dot).unwrap();
        let spread = src.path().join("spread.png");
        two_tone(8, 4).save(&spread).unwrap();

        let reporter = RecordingReporter::default();
        let count = Splitter::new(ProcessMode::Split, 90)
            .split_or_copy(&[dot.clone(), spread], dest.path(), &reporter)
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            std::fs::read(&dot).unwrap(),
            std::fs::read(dest.path().join("dot.png")).unwrap()
        );
        assert!(!dest.path().join("dot_1L.png").exists());
        assert!(dest.path().join("spread_1L.png").exists());
        assert!(dest.path().join("spread_0R.png").exists());
        assert_eq!(
            *reporter.markers.borrow(),
            vec![ProgressMarker::Copied, ProgressMarker::Split]
        );
    }

    #[test]
    fn copy_mode_never_splits() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let page = src.path().join("wide.png");
        RgbImage::new(40, 10).save(&page).unwrap();

        Splitter::new(ProcessMode::Copy, 90)
            .split_or_copy(&[page], dest.path(), &RecordingReporter::default())
            .unwrap();

        assert!(dest.path().join("wide.png").exists());
        assert!(!dest.path().join("wide_1L.png").exists());
    }
}
