//! Error types for notebookify.
//!
//! Library crates use [`NotebookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` and maps variants to exit codes.

use std::path::PathBuf;

/// Top-level error type for all notebookify operations.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The requested input path does not exist.
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A single explicit target does not carry the expected extension.
    #[error("input file must be a .{expected} file: {}", path.display())]
    UnsupportedInput { path: PathBuf, expected: String },

    /// Nothing to convert under the requested path.
    #[error("no .{extension} files found to convert in {}", path.display())]
    NoInputs { path: PathBuf, extension: String },

    /// The output directory could not be created.
    #[error("unable to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Notebook serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Data validation error (unknown cell type, invalid cell id, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotebookError>;

impl NotebookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure to create the output directory.
    pub fn output_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
        }
    }
}
