// comic-tool/src/processors/renumber.rs
//! Sequence renumbering.
//!
//! Planning walks the tree and stages renames without touching anything.
//! Applying requires an explicit [`Approval`].

use crate::core::{ComicToolError, Result};
use crate::reporter::{ProgressMarker, Reporter};
use crate::utils::{count_digits, dotted_extension, is_page_image};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MIN_DIGITS: usize = 3;

lazy_static! {
    /// First run of decimal digits in a file name.
    static ref NUMBER_TOKEN: Regex = Regex::new(r"\d+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRename {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Default)]
pub struct RenumberPlan {
    pub renames: Vec<StagedRename>,
    /// One error per directory whose numbering is not `1..=N`.
    pub rejected: Vec<ComicToolError>,
}

impl RenumberPlan {
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Declined,
}

impl Approval {
    /// `y` or `yes` in any case approves; everything else declines.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Approval::Approved,
            _ => Approval::Declined,
        }
    }
}

pub fn extract_token(file_name: &str) -> Option<u64> {
    NUMBER_TOKEN
        .find(file_name)
        .and_then(|m| m.as_str().parse().ok())
}

/// Checks that the sorted tokens are exactly `1, 2, ..., N`.
pub fn validate_sequence<'a>(dir: &Path, tokens: impl IntoIterator<Item = &'a u64>) -> Result<()> {
    for (index, &token) in tokens.into_iter().enumerate() {
        let expected = index as u64 + 1;
        if token != expected {
            return Err(ComicToolError::SequenceGap {
                dir: dir.to_path_buf(),
                expected,
                found: token,
            });
        }
    }
    Ok(())
}

pub fn canonical_name(token: u64, width: usize, ext: &str) -> String {
    format!("{:0width$}{}", token, ext, width = width)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Renumberer;

impl Renumberer {
    pub fn new() -> Self {
        Self
    }

    /// Scans every directory under `root` and stages the renames each
    /// directory needs. Directories are sequenced independently.
    pub fn plan(&self, root: &Path, reporter: &dyn Reporter) -> Result<RenumberPlan> {
        reporter.info(&format!("> scan {} ...", root.display()));

        let mut plan = RenumberPlan::default();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }

            match self.plan_directory(entry.path(), reporter)? {
                Ok(renames) => plan.renames.extend(renames),
                Err(gap) => {
                    log::warn!("{}", gap);
                    reporter.info(&format!("> {}, skip!", gap));
                    plan.rejected.push(gap);
                }
            }
        }

        Ok(plan)
    }

    /// The outer result is a filesystem failure; the inner one a rejected sequence.
    fn plan_directory(
        &self,
        dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<std::result::Result<Vec<StagedRename>, ComicToolError>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_page_image(path))
            .collect();
        files.sort();

        let mut sequence: BTreeMap<u64, PathBuf> = BTreeMap::new();
        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let token = match extract_token(&name) {
                Some(token) => token,
                None if NUMBER_TOKEN.is_match(&name) => {
                    return Ok(Err(ComicToolError::NumberOutOfRange { path }));
                }
                None => continue,
            };
            if let Some(previous) = sequence.insert(token, path) {
                log::warn!(
                    "Duplicate number {} in {}, dropping {}",
                    token,
                    dir.display(),
                    previous.display()
                );
            }
        }

        if sequence.is_empty() {
            return Ok(Ok(Vec::new()));
        }

        if let Err(gap) = validate_sequence(dir, sequence.keys()) {
            return Ok(Err(gap));
        }

        let width = count_digits(sequence.len() as u64).max(MIN_DIGITS);
        let mut renames = Vec::new();
        for (token, path) in sequence {
            let new_name = canonical_name(token, width, &dotted_extension(&path));
            if path.file_name().map_or(true, |n| n.to_string_lossy() != new_name) {
                let to = path.with_file_name(&new_name);
                log::info!(">   {} -> {}", path.display(), to.display());
                renames.push(StagedRename { from: path, to });
            }
            reporter.progress(ProgressMarker::Numbered);
        }
        reporter.finish_progress();

        Ok(Ok(renames))
    }

    /// Applies every staged rename when approved. Returns how many were renamed.
    pub fn apply(
        &self,
        plan: &RenumberPlan,
        approval: Approval,
        reporter: &dyn Reporter,
    ) -> Result<usize> {
        if plan.is_empty() {
            return Ok(0);
        }

        if approval == Approval::Declined {
            reporter.info("Rename operation cancelled.");
            return Ok(0);
        }

        for rename in &plan.renames {
            std::fs::rename(&rename.from, &rename.to)?;
            reporter.info(&format!(
                ">   {} -> {}",
                rename.from.display(),
                rename.to.display()
            ));
        }

        Ok(plan.len())
    }
}
