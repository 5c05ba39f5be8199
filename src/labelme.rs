//! LabelMe JSON to YOLO box conversion.

use log::{debug, error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::bbox::to_normalized_box;
use crate::error::{Error, Result};
use crate::report::{BatchReport, FileOutcome};
use crate::types::{ClassMap, ImageAnnotation, NormalizedBox, RECTANGLE};
use crate::utils::{
    create_output_directory, create_progress_bar, ensure_input_dir, list_files, write_file,
};

/// Read and parse a single JSON file into an ImageAnnotation, streaming from the file
pub fn read_annotation(path: &Path) -> Result<ImageAnnotation> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert every rectangle of `annotation` with a known label to a normalized box.
///
/// Returns the boxes in shape order and the number of shapes left out.
/// `path` only labels log lines and errors.
pub fn convert_to_yolo_format(
    annotation: &ImageAnnotation,
    class_map: &ClassMap,
    path: &Path,
) -> Result<(Vec<NormalizedBox>, usize)> {
    let mut boxes = Vec::with_capacity(annotation.shapes.len());
    let mut dropped = 0;

    for shape in &annotation.shapes {
        if shape.shape_type != RECTANGLE {
            warn!(
                "'{}' in {} is a {}, not a rectangle; skipped",
                shape.label,
                path.display(),
                shape.shape_type
            );
            dropped += 1;
            continue;
        }

        let class_id = match class_map.resolve(&shape.label) {
            Some(class_id) => class_id,
            None => {
                warn!(
                    "Unknown label '{}' in {}; check the class list",
                    shape.label,
                    path.display()
                );
                dropped += 1;
                continue;
            }
        };

        let (p0, p1) = match shape.points.as_slice() {
            [p0, p1, ..] => (*p0, *p1),
            points => {
                return Err(Error::MalformedShape {
                    path: path.to_path_buf(),
                    label: shape.label.clone(),
                    points: points.len(),
                })
            }
        };

        boxes.push(to_normalized_box(
            class_id,
            annotation.image_width,
            annotation.image_height,
            p0,
            p1,
        ));
    }

    Ok((boxes, dropped))
}

/// Convert one LabelMe JSON file and write its YOLO label file.
///
/// The label file is written even when no shape survives.
pub fn process_labelme_json(
    json_path: &Path,
    output_txt_path: &Path,
    class_map: &ClassMap,
) -> Result<FileOutcome> {
    let annotation = read_annotation(json_path)?;
    if let Some(image_path) = &annotation.image_path {
        debug!("{} annotates {}", json_path.display(), image_path);
    }

    let (boxes, dropped) = convert_to_yolo_format(&annotation, class_map, json_path)?;
    let lines: Vec<String> = boxes.iter().map(NormalizedBox::to_string).collect();
    write_file(output_txt_path, &lines.join("\n"))?;

    info!(
        "Converted: {} -> {}",
        json_path.display(),
        output_txt_path.display()
    );

    Ok(FileOutcome::Converted {
        output: output_txt_path.to_path_buf(),
        written: boxes.len(),
        dropped,
    })
}

/// Convert every `*.json` file of `json_dir` into a `.txt` file in `txt_dir`.
pub fn batch_convert(json_dir: &Path, txt_dir: &Path, class_map: &ClassMap) -> Result<BatchReport> {
    ensure_input_dir(json_dir)?;
    create_output_directory(txt_dir)?;

    info!(
        "--- Converting {} to {} ---",
        json_dir.display(),
        txt_dir.display()
    );

    let json_files = list_files(json_dir, "*.json");
    let pb = create_progress_bar(json_files.len() as u64, "LabelMe");
    let mut report = BatchReport::new();

    for json_path in &json_files {
        let Some(stem) = json_path.file_stem() else {
            continue;
        };
        let mut txt_name = stem.to_os_string();
        txt_name.push(".txt");
        let txt_path = txt_dir.join(txt_name);

        let result = process_labelme_json(json_path, &txt_path, class_map);
        if let Err(e) = &result {
            error!("Failed to process {}: {}", json_path.display(), e);
        }
        report.push(json_path, result);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("--- Conversion finished. ---");
    Ok(report)
}

/// Run [`batch_convert`] for each split, `json_root/<split>` to `txt_root/<split>`.
///
/// With no splits the roots themselves are converted.
pub fn convert_splits<S: AsRef<str>>(
    json_root: &Path,
    txt_root: &Path,
    splits: &[S],
    class_map: &ClassMap,
) -> Result<Vec<(String, BatchReport)>> {
    if splits.is_empty() {
        let report = batch_convert(json_root, txt_root, class_map)?;
        return Ok(vec![(String::new(), report)]);
    }

    splits
        .iter()
        .map(|split| {
            let split = split.as_ref();
            let report =
                batch_convert(&json_root.join(split), &txt_root.join(split), class_map)?;
            Ok((split.to_string(), report))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    fn rectangle(label: &str, p0: (f64, f64), p1: (f64, f64)) -> Shape {
        Shape {
            label: label.to_string(),
            points: vec![p0, p1],
            shape_type: "rectangle".to_string(),
        }
    }

    fn annotation(shapes: Vec<Shape>) -> ImageAnnotation {
        ImageAnnotation {
            shapes,
            image_path: Some("image.jpg".to_string()),
            image_height: 100,
            image_width: 100,
        }
    }

    #[test]
    fn test_convert_to_yolo_format() {
        let annotation = annotation(vec![rectangle("Compost", (10.0, 10.0), (20.0, 20.0))]);
        let (boxes, dropped) =
            convert_to_yolo_format(&annotation, &ClassMap::default(), Path::new("a.json"))
                .unwrap();

        assert_eq!(dropped, 0);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].to_string(), "3 0.15 0.15 0.1 0.1");
    }

    #[test]
    fn test_unknown_label_is_skipped() {
        let annotation = annotation(vec![
            rectangle("Dgrx", (0.0, 0.0), (50.0, 50.0)),
            rectangle("Unknown", (0.0, 0.0), (10.0, 10.0)),
            rectangle("Mrisq", (50.0, 50.0), (100.0, 100.0)),
        ]);
        let (boxes, dropped) =
            convert_to_yolo_format(&annotation, &ClassMap::default(), Path::new("a.json"))
                .unwrap();

        assert_eq!(dropped, 1);
        let ids: Vec<usize> = boxes.iter().map(|b| b.class_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_non_rectangle_is_skipped() {
        let mut polygon = rectangle("Dgrx", (0.0, 0.0), (10.0, 10.0));
        polygon.shape_type = "polygon".to_string();
        polygon.points.push((5.0, 20.0));
        let annotation = annotation(vec![polygon, rectangle("Dgrx", (0.0, 0.0), (10.0, 10.0))]);

        let (boxes, dropped) =
            convert_to_yolo_format(&annotation, &ClassMap::default(), Path::new("a.json"))
                .unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_rectangle_with_one_point_fails() {
        let mut shape = rectangle("Dgrx", (0.0, 0.0), (10.0, 10.0));
        shape.points.truncate(1);
        let annotation = annotation(vec![shape]);

        let result = convert_to_yolo_format(&annotation, &ClassMap::default(), Path::new("a.json"));
        assert!(matches!(
            result,
            Err(Error::MalformedShape { points: 1, .. })
        ));
    }

    #[test]
    fn test_custom_class_map() {
        let class_map = ClassMap::from_labels(&["cat", "dog"]);
        let annotation = annotation(vec![
            rectangle("dog", (0.0, 0.0), (100.0, 100.0)),
            rectangle("Dgrx", (0.0, 0.0), (100.0, 100.0)),
        ]);
        let (boxes, dropped) =
            convert_to_yolo_format(&annotation, &class_map, Path::new("a.json")).unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(boxes[0].to_string(), "1 0.5 0.5 1 1");
    }
}
