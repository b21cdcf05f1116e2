// comic-tool/src/core/mod.rs
pub mod processor;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    /// Cut landscape spreads into two pages.
    Split,
    /// Copy every page unchanged.
    Copy,
}

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub mode: ProcessMode,
    pub jpeg_quality: u8,
    /// Where staging directories are created. Defaults to the destination.
    pub workspace_root: Option<PathBuf>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            mode: ProcessMode::Split,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            workspace_root: None,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ComicToolError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if let Some(root) = &self.workspace_root {
            if !root.is_dir() {
                return Err(ComicToolError::InvalidParameter(format!(
                    "Workspace root is not a directory: {}",
                    root.display()
                )));
            }
        }

        Ok(())
    }
}

/// A unit of work that could not be completed.
#[derive(Debug)]
pub struct UnitFailure {
    pub source: PathBuf,
    pub reason: String,
}

/// Result record of processing one directory (and everything below it).
#[derive(Debug, Default)]
pub struct RunSummary {
    pub units_processed: usize,
    pub errors: Vec<UnitFailure>,
}

impl RunSummary {
    pub fn merge(&mut self, other: RunSummary) {
        self.units_processed += other.units_processed;
        self.errors.extend(other.errors);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum ComicToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to extract {}: {reason}", .archive.display())]
    Extraction { archive: PathBuf, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Sequence gap in {}: expected {expected}, found {found}", .dir.display())]
    SequenceGap {
        dir: PathBuf,
        expected: u64,
        found: u64,
    },

    #[error("Page number too large in {}", .path.display())]
    NumberOutOfRange { path: PathBuf },
}

impl ComicToolError {
    pub fn extraction(archive: &Path, reason: impl ToString) -> Self {
        ComicToolError::Extraction {
            archive: archive.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ComicToolError>;
