use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create `path` and its parents if missing; existing content is kept
pub fn create_output_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Fail with [`Error::InputDirMissing`] unless `path` is a directory
pub fn ensure_input_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::InputDirMissing(path.to_path_buf()))
    }
}

/// Files under `dir` matching the glob `pattern` (e.g. `*.json`, `**/*.txt`), sorted
pub fn list_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = format!("{}/{}", escaped, pattern);

    let mut files: Vec<PathBuf> = match glob(&full_pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Unreadable entry while listing {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            warn!("Invalid file pattern {}: {}", full_pattern, e);
            Vec::new()
        }
    };
    files.sort();
    files
}

/// Read a whole text file, attaching the path to any error
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write `content` to `path`, attaching the path to any error
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io(path, e))
}
