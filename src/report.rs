use std::path::{Path, PathBuf};

use crate::error::Error;

/// Why a file produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `.jpg`/`.png` image with the same base name was found.
    MissingImage,
    /// The file held no object of the target class.
    NoTargetObjects,
    /// The file already carries its sequential name.
    AlreadyNamed,
}

/// What happened to a single input file that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// `written` lines went to `output`; `dropped` input objects were left out.
    Converted {
        output: PathBuf,
        written: usize,
        dropped: usize,
    },
    /// The file was moved to `target`.
    Renamed { target: PathBuf },
    Skipped(SkipReason),
}

// One entry of a batch run
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome, Error>,
}

/// Per-file results of a batch run, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &Path, result: Result<FileOutcome, Error>) {
        self.files.push(FileReport {
            path: path.to_path_buf(),
            result,
        });
    }

    pub fn total_files_processed(&self) -> usize {
        self.files.len()
    }

    pub fn successful_conversions(&self) -> usize {
        self.files
            .iter()
            .filter(|f| {
                matches!(
                    f.result,
                    Ok(FileOutcome::Converted { .. } | FileOutcome::Renamed { .. })
                )
            })
            .count()
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(FileOutcome::Skipped(r)) if r == reason))
            .count()
    }

    /// Files whose processing was aborted, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.files.iter().filter_map(|f| match &f.result {
            Err(e) => Some((f.path.as_path(), e)),
            Ok(_) => None,
        })
    }

    pub fn failed_conversions(&self) -> usize {
        self.failures().count()
    }

    /// Total lines written across all converted files.
    pub fn lines_written(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.result {
                Ok(FileOutcome::Converted { written, .. }) => written,
                _ => 0,
            })
            .sum()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total files processed: {}", self.total_files_processed());
        log::info!("Successful conversions: {}", self.successful_conversions());
        log::info!("Lines written: {}", self.lines_written());

        let missing_image = self.skipped(SkipReason::MissingImage);
        let no_target = self.skipped(SkipReason::NoTargetObjects);
        let already_named = self.skipped(SkipReason::AlreadyNamed);
        let total_skipped = missing_image + no_target + already_named;
        if total_skipped > 0 {
            log::info!(
                "Skipped: {} (missing image file: {}, no target objects: {}, already named: {})",
                total_skipped,
                missing_image,
                no_target,
                already_named
            );
        }

        let failed = self.failed_conversions();
        log::info!("Failed conversions: {}", failed);
        if failed > 0 {
            for (path, e) in self.failures() {
                log::warn!("  {}: {}", path.display(), e);
            }
        }
    }
}
