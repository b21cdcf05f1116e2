// comic-tool/src/processors/workspace.rs
use crate::core::Result;
use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// What a staging directory is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceRole {
    /// Pages of a directory that is itself an image set.
    ImageSet,
    /// Raw contents of an extracted archive.
    Extracted,
    /// Split or copied pages of an extracted archive.
    Repacked,
}

impl WorkspaceRole {
    pub fn prefix(self) -> &'static str {
        match self {
            WorkspaceRole::ImageSet => "temp_",
            WorkspaceRole::Extracted => "temp1_",
            WorkspaceRole::Repacked => "temp2_",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(u64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out staging directories that are unique for the lifetime of a run.
///
/// Uniqueness comes from the per-arena counter plus tempfile's random suffix,
/// never from the caller-provided name.
pub struct WorkspaceArena {
    root: PathBuf,
    next_id: Cell<u64>,
}

impl WorkspaceArena {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_id: Cell::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn acquire(&self, role: WorkspaceRole, name: &str) -> Result<Workspace> {
        let id = WorkspaceId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        std::fs::create_dir_all(&self.root)?;
        let prefix = format!("{}{}_{}_", role.prefix(), sanitize_name(name), id);
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&self.root)?;

        log::debug!("Acquired workspace {} at {}", id, dir.path().display());

        Ok(Workspace { id, role, dir })
    }
}

/// An exclusively owned staging directory. Dropping it deletes the directory.
pub struct Workspace {
    id: WorkspaceId,
    role: WorkspaceRole,
    dir: TempDir,
}

impl Workspace {
    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn role(&self) -> WorkspaceRole {
        self.role
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Deletes the directory and everything under it.
    pub fn release(self) -> Result<()> {
        log::debug!("Releasing workspace {}", self.id);
        self.dir.close()?;
        Ok(())
    }
}

fn sanitize_name(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    name.chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_never_collides() {
        let root = TempDir::new().unwrap();
        let arena = WorkspaceArena::new(root.path());

        let a = arena.acquire(WorkspaceRole::Extracted, "vol1").unwrap();
        let b = arena.acquire(WorkspaceRole::Extracted, "vol1").unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.path(), b.path());
        let name = a.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("temp1_vol1_"));
    }

    #[test]
    fn release_removes_contents() {
        let root = TempDir::new().unwrap();
        let arena = WorkspaceArena::new(root.path());

        let ws = arena.acquire(WorkspaceRole::ImageSet, "ch1").unwrap();
        let path = ws.path().to_path_buf();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/page.jpg"), b"x").unwrap();

        ws.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let arena = WorkspaceArena::new(root.path());
        let path = {
            let ws = arena.acquire(WorkspaceRole::Repacked, "ch1").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn separators_in_names_are_flattened() {
        assert_eq!(sanitize_name("a/b\\c"), "a_b_c");
    }
}
