// comic-tool/src/utils/mod.rs
use std::path::Path;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
pub const ARCHIVE_EXTENSIONS: [&str; 5] = ["zip", "cbz", "rar", "cbr", "7z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    PageImage,
    Archive,
    Other,
}

/// Classifies a file by its extension alone. The file is never opened.
pub fn classify(path: &Path) -> FileKind {
    match get_file_extension(path) {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => FileKind::PageImage,
        Some(ext) if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) => FileKind::Archive,
        _ => FileKind::Other,
    }
}

pub fn is_page_image(path: &Path) -> bool {
    classify(path) == FileKind::PageImage
}

pub fn is_archive(path: &Path) -> bool {
    classify(path) == FileKind::Archive
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// The extension with its leading dot and original case, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

pub fn file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn count_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
