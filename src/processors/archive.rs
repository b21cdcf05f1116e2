// comic-tool/src/processors/archive.rs
use crate::core::{ComicToolError, Result};
use crate::utils::get_file_extension;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    SevenZip,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match get_file_extension(path)?.as_str() {
            "zip" | "cbz" => Some(ArchiveKind::Zip),
            "rar" | "cbr" => Some(ArchiveKind::Rar),
            "7z" => Some(ArchiveKind::SevenZip),
            _ => None,
        }
    }
}

/// Reading and writing of page archives.
pub trait ArchiveCodec {
    /// Unpacks `archive` into the existing directory `dest`.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Packs every file directly under `source_dir` into a flat zip at `archive`
    /// and returns the path written.
    fn build(&self, source_dir: &Path, archive: &Path) -> Result<PathBuf>;
}

/// Extracts zip, rar and 7z by extension; always builds zip.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCodec;

impl StandardCodec {
    pub fn new() -> Self {
        Self
    }

    fn extract_zip(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| ComicToolError::extraction(archive, e))?;
        zip.extract(dest)
            .map_err(|e| ComicToolError::extraction(archive, e))?;
        Ok(())
    }

    fn extract_rar(&self, archive: &Path, dest: &Path) -> Result<()> {
        let mut rar = unrar::Archive::new(archive)
            .open_for_processing()
            .map_err(|e| ComicToolError::extraction(archive, e))?;

        while let Some(header) = rar
            .read_header()
            .map_err(|e| ComicToolError::extraction(archive, e))?
        {
            rar = if header.entry().is_file() {
                header.extract_with_base(dest)
            } else {
                header.skip()
            }
            .map_err(|e| ComicToolError::extraction(archive, e))?;
        }

        Ok(())
    }

    fn extract_7z(&self, archive: &Path, dest: &Path) -> Result<()> {
        sevenz_rust::decompress_file(archive, dest)
            .map_err(|e| ComicToolError::extraction(archive, e))
    }
}

impl ArchiveCodec for StandardCodec {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let kind = ArchiveKind::from_path(archive).ok_or_else(|| {
            ComicToolError::UnsupportedFormat(format!("Not an archive: {}", archive.display()))
        })?;

        log::debug!("Extracting {:?} archive {}", kind, archive.display());

        match kind {
            ArchiveKind::Zip => self.extract_zip(archive, dest),
            ArchiveKind::Rar => self.extract_rar(archive, dest),
            ArchiveKind::SevenZip => self.extract_7z(archive, dest),
        }
    }

    fn build(&self, source_dir: &Path, archive: &Path) -> Result<PathBuf> {
        let archive = archive.to_path_buf();
        if let Some(parent) = archive.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(source_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        // Fixed timestamps keep repeated builds byte-identical.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut zip = ZipWriter::new(BufWriter::new(File::create(&archive)?));
        for path in &entries {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            zip.start_file(name, options)?;
            let mut page = File::open(path)?;
            std::io::copy(&mut page, &mut zip)?;
        }
        zip.finish()?;

        log::debug!("Built {} with {} pages", archive.display(), entries.len());

        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn kinds_from_extension() {
        assert_eq!(ArchiveKind::from_path(Path::new("a.CBZ")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_path(Path::new("a.cbr")), Some(ArchiveKind::Rar));
        assert_eq!(ArchiveKind::from_path(Path::new("a.7z")), Some(ArchiveKind::SevenZip));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tar")), None);
    }

    #[test]
    fn build_then_extract_is_flat_and_sorted() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("b.jpg"), b"second").unwrap();
        std::fs::write(src.path().join("a.jpg"), b"first").unwrap();
        let out = TempDir::new().unwrap();

        let codec = StandardCodec::new();
        let archive = codec.build(src.path(), &out.path().join("Vol.1.cbz")).unwrap();
        assert_eq!(archive.file_name().unwrap(), "Vol.1.cbz");

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "a.jpg");

        let mut contents = String::new();
        zip.by_name("b.jpg").unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "second");

        let unpacked = TempDir::new().unwrap();
        codec.extract(&archive, unpacked.path()).unwrap();
        assert_eq!(std::fs::read(unpacked.path().join("a.jpg")).unwrap(), b"first");
    }

    #[test]
    fn repeated_builds_are_identical() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("p1.png"), b"page").unwrap();
        let out = TempDir::new().unwrap();

        let codec = StandardCodec::new();
        let first = codec.build(src.path(), &out.path().join("one.cbz")).unwrap();
        let second = codec.build(src.path(), &out.path().join("two.cbz")).unwrap();
        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }

    #[test]
    fn corrupt_zip_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.cbz");
        std::fs::write(&bad, b"definitely not a zip").unwrap();

        let result = StandardCodec::new().extract(&bad, dir.path());
        assert!(matches!(result, Err(ComicToolError::Extraction { .. })));
    }

    #[test]
    fn corrupt_rar_and_7z_are_extraction_errors() {
        let dir = TempDir::new().unwrap();
        for name in ["bad.cbr", "bad.7z"] {
            let bad = dir.path().join(name);
            std::fs::write(&bad, b"definitely not an archive").unwrap();
            let out = dir.path().join(format!("{}_out", name));
            std::fs::create_dir(&out).unwrap();

            let result = StandardCodec::new().extract(&bad, &out);
            assert!(
                matches!(result, Err(ComicToolError::Extraction { .. })),
                "{} should fail to extract",
                name
            );
        }
    }

    #[test]
    fn rar_entries_are_extracted() {
        let dir = TempDir::new().unwrap();
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/book.cbr");

        StandardCodec::new().extract(&fixture, dir.path()).unwrap();

        let page = image::open(dir.path().join("p1.png")).unwrap();
        assert_eq!((page.width(), page.height()), (2, 4));
    }
}
