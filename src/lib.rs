//! Annotation conversion utilities
//!
//! This library converts LabelMe JSON and KITTI text annotations to YOLO
//! label files, remaps YOLO class ids between taxonomies and renames image
//! sets sequentially.

pub mod bbox;
pub mod config;
pub mod error;
pub mod kitti;
pub mod labelme;
pub mod remap;
pub mod rename;
pub mod report;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Cli, Command};
pub use error::{Error, Result};
pub use kitti::{batch_convert_kitti, KittiOptions};
pub use labelme::{batch_convert, convert_splits};
pub use remap::batch_remap;
pub use rename::{plan_renames, rename_images};
pub use report::{BatchReport, FileOutcome, SkipReason};
pub use types::{ClassMap, IdRemap, ImageAnnotation, NormalizedBox, Shape};
