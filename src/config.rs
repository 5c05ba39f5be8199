use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::kitti::KittiOptions;
use crate::types::{ClassMap, IdRemap, DEFAULT_CLASSES};

/// Annotation conversion utilities: LabelMe and KITTI to YOLO, class id
/// remapping and sequential image renaming.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert LabelMe JSON rectangles to YOLO label files
    Labelme(LabelmeArgs),
    /// Convert one class of KITTI label files to a YOLO dataset
    Kitti(KittiArgs),
    /// Rewrite the class ids of YOLO label files
    Remap(RemapArgs),
    /// Rename the images of a directory to <prefix>_<index>.<ext>
    Rename(RenameArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LabelmeArgs {
    /// Directory containing the LabelMe JSON files (one sub-directory per split)
    #[arg(short = 'd', long = "json_dir", default_value = "dataset/json_annotations")]
    pub json_dir: PathBuf,

    /// Directory receiving the YOLO label files
    #[arg(short = 'o', long = "output_dir", default_value = "dataset/labels")]
    pub output_dir: PathBuf,

    /// Splits to convert; pass an empty value to convert json_dir itself
    #[arg(long = "splits", value_delimiter = ',', default_value = "train,val")]
    pub splits: Vec<String>,

    /// Ordered label list, the position of a label is its class id
    #[arg(long = "classes", value_delimiter = ',', default_values_t = default_classes())]
    pub classes: Vec<String>,
}

impl LabelmeArgs {
    pub fn class_map(&self) -> ClassMap {
        ClassMap::from_labels(&self.classes)
    }

    /// Splits with blank entries removed
    pub fn split_names(&self) -> Vec<&str> {
        self.splits
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Args, Debug, Clone)]
pub struct KittiArgs {
    /// Directory containing the KITTI .txt label files
    #[arg(long = "labels_dir", default_value = "dataset/batteries_raw/labels")]
    pub labels_dir: PathBuf,

    /// Directory containing the matching .jpg/.png images
    #[arg(long = "images_dir", default_value = "dataset/batteries_raw/images")]
    pub images_dir: PathBuf,

    /// Output dataset directory, receives images/ and labels/
    #[arg(short = 'o', long = "output_dir", default_value = "dataset/batteries_yolo")]
    pub output_dir: PathBuf,

    /// KITTI class name to keep
    #[arg(long = "target_label", default_value = "battery")]
    pub target_label: String,

    /// YOLO class id written for the kept objects
    #[arg(long = "class_id", default_value_t = 0)]
    pub class_id: usize,
}

impl KittiArgs {
    pub fn options(&self) -> KittiOptions {
        KittiOptions {
            target_label: self.target_label.clone(),
            class_id: self.class_id,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RemapArgs {
    /// Root of the YOLO label tree to remap (searched recursively)
    #[arg(short = 'i', long = "input_dir", default_value = "dataset/labels")]
    pub input_dir: PathBuf,

    /// Root of the mirrored output tree
    #[arg(short = 'o', long = "output_dir", default_value = "dataset/labels_converted")]
    pub output_dir: PathBuf,

    /// Id mapping as comma-separated old:new pairs
    #[arg(long = "map", value_delimiter = ',', value_parser = parse_id_pair, default_values_t = default_id_pairs())]
    pub map: Vec<IdPair>,
}

impl RemapArgs {
    pub fn id_remap(&self) -> IdRemap {
        self.map.iter().map(|pair| (pair.old, pair.new)).collect()
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    /// Directory of the images to rename
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: PathBuf,

    /// Prefix of the new names (e.g. 'train' or 'val')
    #[arg(short = 'p', long = "prefix", value_parser = validate_prefix)]
    pub prefix: String,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

/// One `old:new` entry of the remap table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPair {
    pub old: usize,
    pub new: usize,
}

impl std::fmt::Display for IdPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.old, self.new)
    }
}

fn default_classes() -> Vec<String> {
    DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect()
}

fn default_id_pairs() -> Vec<IdPair> {
    IdRemap::default()
        .iter()
        .map(|(old, new)| IdPair { old, new })
        .collect()
}

// Parse an `old:new` pair of class ids
fn parse_id_pair(s: &str) -> Result<IdPair, String> {
    let (old, new) = s
        .split_once(':')
        .ok_or_else(|| format!("expected OLD:NEW, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("'{}' is not a class id", v))
    };
    Ok(IdPair {
        old: parse(old)?,
        new: parse(new)?,
    })
}

// The prefix becomes part of a file name in the same directory
fn validate_prefix(s: &str) -> Result<String, String> {
    if s.is_empty() {
        Err("PREFIX must not be empty".to_string())
    } else if s.contains(['/', '\\']) {
        Err("PREFIX must not contain a path separator".to_string())
    } else {
        Ok(s.to_string())
    }
}
