//! Sequential in-place renaming of image files.
//!
//! Renaming happens in two phases: every pending source is first moved to a
//! hidden temporary name, then every temporary is moved to its target. A
//! target may therefore be the current name of another file in the set.

use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::{BatchReport, FileOutcome, SkipReason};
use crate::utils::{create_progress_bar, ensure_input_dir};

/// File name suffixes selected for renaming (case-sensitive)
pub const RENAME_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".PNG", ".JPG"];

// Width of the zero-padded index
const INDEX_WIDTH: usize = 5;

const TEMP_SUFFIX: &str = "labelkit-tmp";

/// One file of a rename plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub source: String,
    pub target: String,
    temp: String,
}

impl RenameEntry {
    pub fn is_noop(&self) -> bool {
        self.source == self.target
    }
}

/// A validated set of renames inside one directory.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub dir: PathBuf,
    pub entries: Vec<RenameEntry>,
}

impl RenamePlan {
    /// Entries that actually move a file.
    pub fn pending(&self) -> impl Iterator<Item = &RenameEntry> {
        self.entries.iter().filter(|entry| !entry.is_noop())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sequential name of the `index`-th (1-based) file.
pub fn sequential_name(prefix: &str, index: usize, extension: &str) -> String {
    format!(
        "{}_{:0width$}{}",
        prefix,
        index,
        extension,
        width = INDEX_WIDTH
    )
}

/// `.ext` of `file_name`, case preserved; empty for names without one
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Image file names in `dir` with a [`RENAME_EXTENSIONS`] suffix, sorted.
pub fn list_images(dir: &Path) -> Result<Vec<String>> {
    ensure_input_dir(dir)?;
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut image_files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        // follows symlinks, like utils::list_files
        if !entry.path().is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };
        if RENAME_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            image_files.push(name);
        }
    }

    image_files.sort();
    Ok(image_files)
}

/// Compute the renames of `dir` and validate them before anything is moved.
///
/// Fails with [`Error::RenameCollision`] when a target, or a temporary name,
/// is taken by a file outside the rename set.
pub fn plan_renames(dir: &Path, prefix: &str) -> Result<RenamePlan> {
    let image_files = list_images(dir)?;
    let sources: HashSet<&str> = image_files.iter().map(String::as_str).collect();

    let mut entries = Vec::with_capacity(image_files.len());
    for (idx, source) in image_files.iter().enumerate() {
        let index = idx + 1;
        let target = sequential_name(prefix, index, &extension_of(source));
        let temp = format!(".{}_{}.{}", prefix, index, TEMP_SUFFIX);

        if !sources.contains(target.as_str()) && dir.join(&target).exists() {
            return Err(Error::RenameCollision {
                source_name: source.clone(),
                target_name: target,
            });
        }
        if dir.join(&temp).exists() {
            return Err(Error::RenameCollision {
                source_name: source.clone(),
                target_name: temp,
            });
        }

        entries.push(RenameEntry {
            source: source.clone(),
            target,
            temp,
        });
    }

    Ok(RenamePlan {
        dir: dir.to_path_buf(),
        entries,
    })
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| Error::io(from, e))
}

/// Carry out a plan produced by [`plan_renames`].
///
/// A file that cannot be moved is reported and left under its original name
/// whenever that name is still free.
pub fn execute_plan(plan: &RenamePlan) -> BatchReport {
    let dir = &plan.dir;
    let mut report = BatchReport::new();
    let pb = create_progress_bar(plan.entries.len() as u64, "Rename");

    let mut staged = Vec::new();
    for entry in &plan.entries {
        let source_path = dir.join(&entry.source);
        if entry.is_noop() {
            report.push(&source_path, Ok(FileOutcome::Skipped(SkipReason::AlreadyNamed)));
            pb.inc(1);
            continue;
        }

        match rename(&source_path, &dir.join(&entry.temp)) {
            Ok(()) => staged.push(entry),
            Err(e) => {
                error!("Failed to rename {}: {}", entry.source, e);
                report.push(&source_path, Err(e));
                pb.inc(1);
            }
        }
    }

    for entry in staged {
        let source_path = dir.join(&entry.source);
        let temp_path = dir.join(&entry.temp);
        let target_path = dir.join(&entry.target);

        let result = if target_path.exists() {
            Err(Error::RenameCollision {
                source_name: entry.source.clone(),
                target_name: entry.target.clone(),
            })
        } else {
            rename(&temp_path, &target_path)
        };

        match result {
            Ok(()) => {
                info!("Renamed: '{}' -> '{}'", entry.source, entry.target);
                report.push(
                    &source_path,
                    Ok(FileOutcome::Renamed {
                        target: target_path,
                    }),
                );
            }
            Err(e) => {
                error!("Failed to rename {}: {}", entry.source, e);
                if !source_path.exists() {
                    if let Err(restore) = rename(&temp_path, &source_path) {
                        error!("Could not restore {}: {}", entry.source, restore);
                    }
                }
                report.push(&source_path, Err(e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    report
}

/// Rename the images of `dir` to `<prefix>_<index>.<ext>` in sorted order.
pub fn rename_images(dir: &Path, prefix: &str) -> Result<BatchReport> {
    info!("--- Renaming images in: {} ---", dir.display());

    let plan = plan_renames(dir, prefix)?;
    if plan.is_empty() {
        info!("No image files found to rename.");
        return Ok(BatchReport::new());
    }

    let report = execute_plan(&plan);
    info!(
        "--- Renaming finished. {} images renamed. ---",
        report.successful_conversions()
    );
    Ok(report)
}
