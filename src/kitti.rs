//! KITTI text labels to YOLO boxes for a single target class.

use log::{error, info};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bbox::to_normalized_box;
use crate::error::{Error, Result};
use crate::report::{BatchReport, FileOutcome, SkipReason};
use crate::utils::{
    create_output_directory, create_progress_bar, ensure_input_dir, list_files, read_to_string,
    write_file,
};

/// Image extensions tried, in order, when pairing a label file with its image
pub const PAIRED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

// Decimals written for each normalized value
const PRECISION: usize = 6;

/// Which KITTI class to keep and the YOLO class id it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittiOptions {
    pub target_label: String,
    pub class_id: usize,
}

impl Default for KittiOptions {
    fn default() -> Self {
        Self {
            target_label: "battery".to_string(),
            class_id: 0,
        }
    }
}

/// The fields of a KITTI object line used for conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct KittiObject {
    pub class_name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl KittiObject {
    /// Parse a whitespace-separated line: `type truncated occluded alpha xmin ymin xmax ymax ...`.
    ///
    /// `path` and `line` locate the error when a field is missing or not numeric.
    pub fn parse(text: &str, path: &Path, line: usize) -> Result<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let malformed = |message: String| Error::MalformedLine {
            path: path.to_path_buf(),
            line,
            message,
        };

        if parts.len() < 8 {
            return Err(malformed(format!(
                "expected at least 8 fields, found {}",
                parts.len()
            )));
        }

        let coord = |idx: usize| -> Result<f64> {
            parts[idx]
                .parse::<f64>()
                .map_err(|e| malformed(format!("field {} ('{}'): {}", idx, parts[idx], e)))
        };

        Ok(Self {
            class_name: parts[0].to_string(),
            xmin: coord(4)?,
            ymin: coord(5)?,
            xmax: coord(6)?,
            ymax: coord(7)?,
        })
    }
}

/// Find `<base_name>.jpg`, then `<base_name>.png`, in `images_dir`.
pub fn find_paired_image(images_dir: &Path, base_name: &OsStr) -> Option<PathBuf> {
    PAIRED_IMAGE_EXTENSIONS.iter().find_map(|ext| {
        let mut file_name = OsString::from(base_name);
        file_name.push(".");
        file_name.push(ext);
        let candidate = images_dir.join(file_name);
        candidate.is_file().then_some(candidate)
    })
}

/// Read the pixel size of an image from its header
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    let size = imagesize::size(path).map_err(|source| Error::ImageSize {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((size.width as u32, size.height as u32))
}

/// Convert the target-class lines of a KITTI label file to YOLO lines.
///
/// Lines of other classes are not parsed beyond their first field.
pub fn convert_kitti_labels(
    content: &str,
    image_size: (u32, u32),
    options: &KittiOptions,
    path: &Path,
) -> Result<(Vec<String>, usize)> {
    let mut yolo_lines = Vec::new();
    let mut dropped = 0;

    for (idx, line) in content.lines().enumerate() {
        let class_name = match line.split_whitespace().next() {
            Some(class_name) => class_name,
            None => continue,
        };
        if class_name != options.target_label {
            dropped += 1;
            continue;
        }

        let object = KittiObject::parse(line, path, idx + 1)?;
        let yolo_box = to_normalized_box(
            options.class_id,
            image_size.0,
            image_size.1,
            (object.xmin, object.ymin),
            (object.xmax, object.ymax),
        );
        yolo_lines.push(yolo_box.to_fixed_line(PRECISION));
    }

    Ok((yolo_lines, dropped))
}

/// Convert one KITTI label file, copying its image next to the new label.
///
/// Nothing is written when the file holds no object of the target class.
pub fn process_kitti_file(
    label_path: &Path,
    images_dir: &Path,
    output_labels_dir: &Path,
    output_images_dir: &Path,
    options: &KittiOptions,
) -> Result<FileOutcome> {
    let Some(base_name) = label_path.file_stem() else {
        return Ok(FileOutcome::Skipped(SkipReason::MissingImage));
    };
    let Some(image_path) = find_paired_image(images_dir, base_name) else {
        return Ok(FileOutcome::Skipped(SkipReason::MissingImage));
    };

    let image_size = image_dimensions(&image_path)?;
    let content = read_to_string(label_path)?;
    let (yolo_lines, dropped) = convert_kitti_labels(&content, image_size, options, label_path)?;

    if yolo_lines.is_empty() {
        return Ok(FileOutcome::Skipped(SkipReason::NoTargetObjects));
    }

    let mut label_name = base_name.to_os_string();
    label_name.push(".txt");
    let out_label_path = output_labels_dir.join(label_name);
    write_file(&out_label_path, &yolo_lines.join("\n"))?;

    if let Some(image_name) = image_path.file_name() {
        let out_image_path = output_images_dir.join(image_name);
        fs::copy(&image_path, &out_image_path).map_err(|e| Error::io(&out_image_path, e))?;
    }

    Ok(FileOutcome::Converted {
        output: out_label_path,
        written: yolo_lines.len(),
        dropped,
    })
}

/// Convert every `*.txt` KITTI file of `labels_dir` into `output_dir/{labels,images}`.
pub fn batch_convert_kitti(
    labels_dir: &Path,
    images_dir: &Path,
    output_dir: &Path,
    options: &KittiOptions,
) -> Result<BatchReport> {
    ensure_input_dir(labels_dir)?;
    let output_images_dir = create_output_directory(&output_dir.join("images"))?;
    let output_labels_dir = create_output_directory(&output_dir.join("labels"))?;

    let mut report = BatchReport::new();
    let txt_files = list_files(labels_dir, "*.txt");
    if txt_files.is_empty() {
        error!("No .txt file found in {}", labels_dir.display());
        return Ok(report);
    }

    info!(
        "Found {} label files. Keeping '{}' as class {}...",
        txt_files.len(),
        options.target_label,
        options.class_id
    );

    let pb = create_progress_bar(txt_files.len() as u64, "KITTI");
    for txt_path in &txt_files {
        let result = process_kitti_file(
            txt_path,
            images_dir,
            &output_labels_dir,
            &output_images_dir,
            options,
        );
        if let Err(e) = &result {
            error!("Failed to process {}: {}", txt_path.display(), e);
        }
        report.push(txt_path, result);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("------------------------------------------------");
    info!("Conversion finished!");
    info!(
        "Files converted (containing '{}'): {}",
        options.target_label,
        report.successful_conversions()
    );
    info!("Dataset ready in: {}", output_dir.display());
    info!("------------------------------------------------");

    Ok(report)
}
