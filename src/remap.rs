//! Class id remapping of YOLO label trees.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::{BatchReport, FileOutcome};
use crate::types::IdRemap;
use crate::utils::{
    create_output_directory, create_progress_bar, ensure_input_dir, list_files, read_to_string,
    write_file,
};

/// Written at the root of every remapped tree
pub const MANIFEST_FILE: &str = "remap.json";

/// Record of a finished remap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapManifest {
    pub source: PathBuf,
    pub mapping: IdRemap,
}

/// Result of remapping one label line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemappedLine {
    Line(String),
    Blank,
    /// The id has no entry in the table; the line is dropped.
    UnknownId(usize),
    /// The first token is not a class id; the line is dropped.
    InvalidId(String),
}

/// Rewrite the leading class id of `line`, passing the other tokens through.
pub fn remap_line(line: &str, remap: &IdRemap) -> RemappedLine {
    let mut parts = line.split_whitespace();
    let Some(first) = parts.next() else {
        return RemappedLine::Blank;
    };

    let current_id = match first.parse::<usize>() {
        Ok(id) => id,
        Err(_) => return RemappedLine::InvalidId(first.to_string()),
    };

    match remap.remap(current_id) {
        Some(new_id) => {
            let mut new_line = new_id.to_string();
            for part in parts {
                new_line.push(' ');
                new_line.push_str(part);
            }
            RemappedLine::Line(new_line)
        }
        None => RemappedLine::UnknownId(current_id),
    }
}

/// Remap every line of a label file's content. Returns the new content and
/// the number of dropped non-blank lines.
pub fn remap_content(content: &str, remap: &IdRemap, path: &Path) -> (String, usize) {
    let mut output = String::with_capacity(content.len());
    let mut dropped = 0;

    for line in content.lines() {
        match remap_line(line, remap) {
            RemappedLine::Line(new_line) => {
                output.push_str(&new_line);
                output.push('\n');
            }
            RemappedLine::Blank => {}
            RemappedLine::UnknownId(id) => {
                warn!("Unknown class id {} in {}", id, path.display());
                dropped += 1;
            }
            RemappedLine::InvalidId(_) => {
                error!("Error parsing line in {}: {}", path.display(), line);
                dropped += 1;
            }
        }
    }

    (output, dropped)
}

/// Remap `file_path` into the same relative location under `output_root`.
///
/// The output file is always written, even when every line was dropped.
pub fn remap_file(
    file_path: &Path,
    input_root: &Path,
    output_root: &Path,
    remap: &IdRemap,
) -> Result<FileOutcome> {
    let rel_path =
        relative_to(file_path, input_root).ok_or_else(|| Error::OutsideInputRoot {
            path: file_path.to_path_buf(),
            root: input_root.to_path_buf(),
        })?;
    let out_path = output_root.join(rel_path);
    if let Some(parent) = out_path.parent() {
        create_output_directory(parent)?;
    }

    let content = read_to_string(file_path)?;
    let (new_content, dropped) = remap_content(&content, remap, file_path);
    write_file(&out_path, &new_content)?;

    Ok(FileOutcome::Converted {
        written: new_content.lines().count(),
        output: out_path,
        dropped,
    })
}

/// Path of `path` relative to `root`, ignoring `.` components on both sides
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let mut path_parts = path.components().filter(|c| *c != Component::CurDir);
    for root_part in root.components().filter(|c| *c != Component::CurDir) {
        if path_parts.next() != Some(root_part) {
            return None;
        }
    }

    let rel: PathBuf = path_parts.collect();
    if rel.as_os_str().is_empty() {
        None
    } else {
        Some(rel)
    }
}

/// Resolve `path` to an absolute path, following symlinks of its existing ancestors
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .map_err(|e| Error::io(existing, e))?;
    for name in rest.into_iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Refuse runs that would read their own output or an already remapped tree.
pub fn check_remap_roots(input_root: &Path, output_root: &Path) -> Result<()> {
    ensure_input_dir(input_root)?;
    let input = resolve_path(input_root)?;

    // a manifest above the input (remapped split) or anywhere inside it
    let manifest = input
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
        .or_else(|| {
            list_files(input_root, &format!("**/{}", MANIFEST_FILE))
                .into_iter()
                .next()
        });
    if let Some(manifest) = manifest {
        return Err(Error::AlreadyRemapped {
            input: input_root.to_path_buf(),
            manifest,
        });
    }

    let output = resolve_path(output_root)?;
    if output.starts_with(&input) {
        return Err(Error::OutputInsideInput { input, output });
    }
    Ok(())
}

/// Remap every `*.txt` file below `input_root` into a mirrored tree under `output_root`.
pub fn batch_remap(input_root: &Path, output_root: &Path, remap: &IdRemap) -> Result<BatchReport> {
    check_remap_roots(input_root, output_root)?;

    info!("Starting conversion...");
    info!("Input: {}", input_root.display());
    info!("Output: {}", output_root.display());
    info!("Mapping: {}", remap);

    let mut report = BatchReport::new();
    let txt_files = list_files(input_root, "**/*.txt");
    if txt_files.is_empty() {
        error!("No .txt files found! Check the input directory.");
        return Ok(report);
    }

    info!("Found {} label files. Processing...", txt_files.len());
    create_output_directory(output_root)?;

    let pb = create_progress_bar(txt_files.len() as u64, "Remap");
    for file_path in &txt_files {
        let result = remap_file(file_path, input_root, output_root, remap);
        if let Err(e) = &result {
            error!("Failed to process {}: {}", file_path.display(), e);
        }
        report.push(file_path, result);
        pb.inc(1);
    }
    pb.finish_and_clear();

    write_manifest(input_root, output_root, remap)?;

    info!("Done!");
    info!("New labels are located in: {}", output_root.display());
    info!("Remember to point your data.yaml to the new labels folder.");
    Ok(report)
}

fn write_manifest(input_root: &Path, output_root: &Path, remap: &IdRemap) -> Result<()> {
    let manifest = RemapManifest {
        source: input_root.to_path_buf(),
        mapping: remap.clone(),
    };
    let path = output_root.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    write_file(&path, &json)
}
