//! Bounding box normalization shared by the converters.

use crate::types::NormalizedBox;

/// Normalize a box given by two opposite pixel corners into YOLO center/size form.
///
/// Corner order is free. Values are not clamped to `[0, 1]`, and a zero image
/// dimension yields `inf`/`NaN` rather than an error.
pub fn normalize_box(
    image_width: f64,
    image_height: f64,
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
) -> (f64, f64, f64, f64) {
    let x_center = (x0 + x1) / 2.0 / image_width;
    let y_center = (y0 + y1) / 2.0 / image_height;
    let width = (x1 - x0).abs() / image_width;
    let height = (y1 - y0).abs() / image_height;

    (x_center, y_center, width, height)
}

/// Inverse of [`normalize_box`]: pixel `(xmin, ymin, xmax, ymax)`.
pub fn denormalize_box(
    image_width: f64,
    image_height: f64,
    (x_center, y_center, width, height): (f64, f64, f64, f64),
) -> (f64, f64, f64, f64) {
    let half_w = width * image_width / 2.0;
    let half_h = height * image_height / 2.0;
    let cx = x_center * image_width;
    let cy = y_center * image_height;

    (cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}

/// Normalize a corner pair and attach `class_id`.
pub fn to_normalized_box(
    class_id: usize,
    image_width: u32,
    image_height: u32,
    p0: (f64, f64),
    p1: (f64, f64),
) -> NormalizedBox {
    let (x_center, y_center, width, height) =
        normalize_box(image_width as f64, image_height as f64, p0, p1);
    NormalizedBox {
        class_id,
        x_center,
        y_center,
        width,
        height,
    }
}
