use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// A directory could not be enumerated.
///
/// Recovered locally: the coordinator treats it as an empty listing.
#[derive(Debug, Error)]
#[error("cannot list '{}': {source}", .path.display())]
pub struct EnumerationError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A table row index outside `0..len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row {row} out of range (table has {len} rows)")]
pub struct RowOutOfRange {
    pub row: usize,
    pub len: usize,
}

/// Result type for file operations.
pub type OpResult<T> = std::result::Result<T, OpError>;

/// User-facing failures of file operations and launcher actions.
///
/// Every variant carrying a path names it in its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("No file selected")]
    NoSelection,

    #[error("The file '{}' could not be renamed: {cause}", .path.display())]
    RenameFailed { path: PathBuf, cause: String },

    #[error("The file '{}' could not be deleted: {cause}", .path.display())]
    DeleteFailed { path: PathBuf, cause: String },

    #[error("The file '{}' could not be created: {cause}", .path.display())]
    CreateFailed { path: PathBuf, cause: String },

    #[error("The file '{}' already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("The file '{}' could not be copied: {cause}", .path.display())]
    CopyFailed { path: PathBuf, cause: String },

    #[error("'{action}' is not supported on this platform for '{}'", .path.display())]
    LauncherUnsupported { action: String, path: PathBuf },

    #[error("'{action}' failed for '{}': {cause}", .path.display())]
    LaunchFailed {
        action: String,
        path: PathBuf,
        cause: String,
    },
}

impl OpError {
    /// Short title for the error dialog.
    pub fn title(&self) -> &'static str {
        match self {
            OpError::NoSelection => "Select File",
            OpError::RenameFailed { .. } => "Rename Failed",
            OpError::DeleteFailed { .. } => "Delete Failed",
            OpError::CreateFailed { .. } => "Create Failed",
            OpError::AlreadyExists { .. } => "Already Exists",
            OpError::CopyFailed { .. } => "Copy Failed",
            OpError::LauncherUnsupported { .. } | OpError::LaunchFailed { .. } => "Launch Failed",
        }
    }
}
