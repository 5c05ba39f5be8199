use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Class names of the target taxonomy, in class id order
pub const DEFAULT_CLASSES: &[&str] = &["Dgrx", "Mrisq", "NonCompost", "Compost"];

/// Garbage-detection ids (BIODEGRADABLE, CARDBOARD, GLASS, METAL, PAPER, PLASTIC)
/// mapped onto [`DEFAULT_CLASSES`]
pub const DEFAULT_ID_MAPPING: &[(usize, usize)] = &[(0, 3), (1, 2), (2, 2), (3, 1), (4, 2), (5, 2)];

// Shape kind handled by the box converter
pub const RECTANGLE: &str = "rectangle";

// The Shape struct representing annotated shapes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shape {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub shape_type: String,
}

// The ImageAnnotation struct representing the annotation information of an image
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub image_path: Option<String>,
    pub image_height: u32,
    pub image_width: u32,
}

/// A box in YOLO layout: center and size as fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    /// Format as `class x y w h` with a fixed number of decimals.
    pub fn to_fixed_line(&self, precision: usize) -> String {
        format!(
            "{} {:.p$} {:.p$} {:.p$} {:.p$}",
            self.class_id,
            self.x_center,
            self.y_center,
            self.width,
            self.height,
            p = precision
        )
    }
}

impl fmt::Display for NormalizedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Label name to class id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    ids: HashMap<String, usize>,
}

impl ClassMap {
    /// Build a map where each label's class id is its position in `labels`.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let ids = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.as_ref().to_string(), id))
            .collect();
        Self { ids }
    }

    /// Look up the class id of `label`.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::from_labels(DEFAULT_CLASSES)
    }
}

/// Old class id to new class id table. Many-to-one is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRemap {
    mapping: BTreeMap<usize, usize>,
}

impl IdRemap {
    pub fn new(mapping: BTreeMap<usize, usize>) -> Self {
        Self { mapping }
    }

    /// New id for `old`, or `None` when the line carrying it must be dropped.
    pub fn remap(&self, old: usize) -> Option<usize> {
        self.mapping.get(&old).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.mapping.iter().map(|(&old, &new)| (old, new))
    }
}

impl Default for IdRemap {
    fn default() -> Self {
        DEFAULT_ID_MAPPING.iter().copied().collect()
    }
}

impl FromIterator<(usize, usize)> for IdRemap {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for IdRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .iter()
            .map(|(old, new)| format!("{}: {}", old, new))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}
