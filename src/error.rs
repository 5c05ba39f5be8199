use std::path::PathBuf;

/// Errors raised while converting, remapping or renaming annotation files.
///
/// Per-file variants are captured into a [`BatchReport`](crate::BatchReport)
/// and never abort a batch; directory-level variants end the whole run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A LabelMe JSON file could not be parsed.
    #[error("failed to parse JSON ({}): {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The pixel dimensions of an image could not be read from its header.
    #[error("failed to read image size ({}): {source}", .path.display())]
    ImageSize {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    /// A text annotation line is missing fields or holds a non-numeric value.
    #[error("malformed line {line} in {}: {message}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A rectangle shape does not carry two corner points.
    #[error("shape '{label}' in {} has {points} point(s), a rectangle needs 2", .path.display())]
    MalformedShape {
        path: PathBuf,
        label: String,
        points: usize,
    },

    /// The input directory of a batch does not exist.
    #[error("input directory does not exist: {}", .0.display())]
    InputDirMissing(PathBuf),

    /// The output tree of a remap run would overlap its input tree.
    #[error("output directory {} is inside input directory {}", .output.display(), .input.display())]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    /// A file listed under an input root does not lie below it.
    #[error("{} is not below input directory {}", .path.display(), .root.display())]
    OutsideInputRoot { path: PathBuf, root: PathBuf },

    /// The input tree was produced by an earlier remap run.
    #[error("{} was already remapped (found {})", .input.display(), .manifest.display())]
    AlreadyRemapped { input: PathBuf, manifest: PathBuf },

    /// A rename target already exists and is not part of the rename set.
    #[error("cannot rename '{source_name}' to '{target_name}': target already exists")]
    RenameCollision {
        source_name: String,
        target_name: String,
    },

    /// The user declined the confirmation prompt.
    #[error("operation cancelled by user")]
    Cancelled,

    /// The confirmation prompt could not be shown.
    #[error("confirmation prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
