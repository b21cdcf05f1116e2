// comic-tool/src/core/processor.rs
use super::{ComicToolError, ProcessConfig, Result, RunSummary, UnitFailure};
use crate::processors::{
    ArchiveCodec, Splitter, StandardCodec, Workspace, WorkspaceArena, WorkspaceRole,
};
use crate::reporter::Reporter;
use crate::utils::{classify, file_stem_lossy, FileKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

/// One directory visited during a run.
#[derive(Debug)]
pub struct TreeNode {
    pub path: PathBuf,
    /// Relative to the processing root; empty for the root itself.
    pub relative: PathBuf,
    pub subdirs: Vec<String>,
    pub files: Vec<ClassifiedFile>,
}

impl TreeNode {
    /// Lists the immediate children of `path`, sorted by name.
    pub fn scan(root: &Path, path: &Path) -> Result<Self> {
        let relative = path.strip_prefix(root).unwrap_or(Path::new("")).to_path_buf();

        let mut subdirs = Vec::new();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let child = entry.path();
            if entry.file_type()?.is_dir() {
                subdirs.push(entry.file_name().to_string_lossy().into_owned());
            } else if child.is_file() {
                let kind = classify(&child);
                files.push(ClassifiedFile { path: child, kind });
            }
        }
        subdirs.sort();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Self {
            path: path.to_path_buf(),
            relative,
            subdirs,
            files,
        })
    }

    pub fn files_of(&self, kind: FileKind) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.path.clone())
            .collect()
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string())
    }

    pub fn display_relative(&self) -> String {
        if self.relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            self.relative.display().to_string()
        }
    }
}

struct RunContext<'a> {
    source_root: &'a Path,
    dest_root: &'a Path,
    arena: WorkspaceArena,
    reporter: &'a dyn Reporter,
}

/// Rebuilds a source tree of pages and archives as a tree of flat `.cbz` files.
pub struct TreeProcessor<C: ArchiveCodec = StandardCodec> {
    config: ProcessConfig,
    splitter: Splitter,
    codec: C,
}

impl TreeProcessor<StandardCodec> {
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_codec(config, StandardCodec::new())
    }
}

impl<C: ArchiveCodec> TreeProcessor<C> {
    pub fn with_codec(config: ProcessConfig, codec: C) -> Self {
        let splitter = Splitter::new(config.mode, config.jpeg_quality);
        Self {
            config,
            splitter,
            codec,
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    pub fn process(
        &self,
        source: &Path,
        dest: &Path,
        reporter: &dyn Reporter,
    ) -> Result<RunSummary> {
        self.config.validate()?;
        validate_paths(source, dest)?;

        std::fs::create_dir_all(dest)?;
        let source_root = source.canonicalize()?;
        let dest_root = dest.canonicalize()?;
        if source_root == dest_root {
            return Err(ComicToolError::InvalidParameter(format!(
                "Source and destination directories cannot be the same: {}",
                source_root.display()
            )));
        }
        let workspace_root = self
            .config
            .workspace_root
            .clone()
            .unwrap_or_else(|| dest_root.clone());

        log::info!(
            "Processing {} into {} ({:?} mode)",
            source_root.display(),
            dest_root.display(),
            self.config.mode
        );

        let ctx = RunContext {
            source_root: &source_root,
            dest_root: &dest_root,
            arena: WorkspaceArena::new(workspace_root),
            reporter,
        };

        self.process_dir(&ctx, &source_root)
    }

    /// Handles one directory, then each of its subdirectories.
    fn process_dir(&self, ctx: &RunContext<'_>, dir: &Path) -> Result<RunSummary> {
        if dir == ctx.dest_root {
            return Ok(RunSummary::default());
        }

        let node = TreeNode::scan(ctx.source_root, dir)?;
        ctx.reporter
            .info(&format!("> scan {} ...", node.display_relative()));

        let images = node.files_of(FileKind::PageImage);
        let archives = node.files_of(FileKind::Archive);

        let mut summary = if !images.is_empty() {
            self.process_image_set(ctx, &node, &images)?
        } else if !archives.is_empty() {
            self.process_archives(ctx, &node, &archives)?
        } else {
            ctx.reporter
                .info(&format!("> skip {} ...", node.display_relative()));
            RunSummary::default()
        };

        for subdir in &node.subdirs {
            summary.merge(self.process_dir(ctx, &node.path.join(subdir))?);
        }

        Ok(summary)
    }

    fn process_image_set(
        &self,
        ctx: &RunContext<'_>,
        node: &TreeNode,
        images: &[PathBuf],
    ) -> Result<RunSummary> {
        ctx.reporter.info(&format!(
            "> Process images files in {} ...",
            node.display_relative()
        ));

        let workspace = ctx.arena.acquire(WorkspaceRole::ImageSet, &node.name())?;
        let count = self
            .splitter
            .split_or_copy(images, workspace.path(), ctx.reporter)?;

        let target = image_set_archive_path(ctx.dest_root, node);
        let built = self.codec.build(workspace.path(), &target)?;
        workspace.release()?;

        ctx.reporter.info(&format!(
            "> Compressed {} images into {}",
            count,
            built.display()
        ));

        Ok(RunSummary {
            units_processed: 1,
            errors: Vec::new(),
        })
    }

    fn process_archives(
        &self,
        ctx: &RunContext<'_>,
        node: &TreeNode,
        archives: &[PathBuf],
    ) -> Result<RunSummary> {
        let dest_dir = ctx.dest_root.join(&node.relative);
        std::fs::create_dir_all(&dest_dir)?;

        let mut summary = RunSummary::default();
        for archive in archives {
            ctx.reporter
                .info(&format!("> Process archive file {} ...", archive.display()));

            match self.process_archive(ctx, node, archive, &dest_dir)? {
                Ok(built) => {
                    summary.units_processed += 1;
                    log::debug!("Finished {}", built.display());
                }
                Err(failure) => {
                    ctx.reporter.error(&format!(
                        "{}: {}",
                        failure.source.display(),
                        failure.reason
                    ));
                    summary.errors.push(failure);
                }
            }
        }

        ctx.reporter.info(&format!(
            "> Compressed {} archives files.",
            summary.units_processed
        ));

        Ok(summary)
    }

    /// The outer result is fatal; the inner one fails only this archive.
    fn process_archive(
        &self,
        ctx: &RunContext<'_>,
        node: &TreeNode,
        archive: &Path,
        dest_dir: &Path,
    ) -> Result<std::result::Result<PathBuf, UnitFailure>> {
        let extracted = ctx.arena.acquire(WorkspaceRole::Extracted, &node.name())?;
        if let Err(e) = self.codec.extract(archive, extracted.path()) {
            return Ok(Err(UnitFailure {
                source: archive.to_path_buf(),
                reason: extraction_reason(e),
            }));
        }

        let content_root = effective_root(extracted.path())?;
        let images = immediate_images(&content_root)?;

        let repacked = ctx.arena.acquire(WorkspaceRole::Repacked, &node.name())?;
        let count = self
            .splitter
            .split_or_copy(&images, repacked.path(), ctx.reporter)?;

        let target = dest_dir.join(format!("{}.cbz", file_stem_lossy(archive)));
        let built = self.codec.build(repacked.path(), &target)?;

        release_all(extracted, repacked)?;

        ctx.reporter.info(&format!(
            "> Compressed {} images into {}",
            count,
            built.display()
        ));

        Ok(Ok(built))
    }
}

fn release_all(first: Workspace, second: Workspace) -> Result<()> {
    let first = first.release();
    let second = second.release();
    first.and(second)
}

fn extraction_reason(error: ComicToolError) -> String {
    match error {
        ComicToolError::Extraction { reason, .. } => reason,
        other => other.to_string(),
    }
}

/// `{dest}/{relative}.cbz`, or `{dest}/{rootName}.cbz` for the root itself.
fn image_set_archive_path(dest_root: &Path, node: &TreeNode) -> PathBuf {
    let file_name = format!("{}.cbz", node.name());
    match node.relative.parent() {
        Some(parent) if !node.relative.as_os_str().is_empty() => {
            dest_root.join(parent).join(file_name)
        }
        _ => dest_root.join(file_name),
    }
}

/// Looks through a single wrapping folder: an extracted tree with exactly one
/// top-level directory and no top-level files is replaced by that directory.
pub fn effective_root(extracted: &Path) -> Result<PathBuf> {
    let mut dirs = Vec::new();
    let mut has_files = false;
    for entry in std::fs::read_dir(extracted)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        } else {
            has_files = true;
        }
    }

    if dirs.len() == 1 && !has_files {
        Ok(dirs.remove(0))
    } else {
        Ok(extracted.to_path_buf())
    }
}

fn immediate_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && classify(path) == FileKind::PageImage)
        .collect();
    images.sort();
    Ok(images)
}

fn validate_paths(source: &Path, dest: &Path) -> Result<()> {
    if !source.exists() {
        return Err(ComicToolError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Source directory does not exist: {}", source.display()),
        )));
    }

    if !source.is_dir() {
        return Err(ComicToolError::InvalidParameter(format!(
            "Source path is not a directory: {}",
            source.display()
        )));
    }

    if dest.exists() && !dest.is_dir() {
        return Err(ComicToolError::InvalidParameter(format!(
            "Destination exists but is not a directory: {}",
            dest.display()
        )));
    }

    if source == dest {
        return Err(ComicToolError::InvalidParameter(
            "Source and destination directories cannot be the same".to_string(),
        ));
    }

    Ok(())
}
