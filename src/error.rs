//! Error types
//!
//! Every failure aborts the run. The variants mirror the ways a sync can go
//! wrong so callers (and tests) can tell misconfiguration from I/O trouble.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The config directory is unset everywhere, or set but blank.
    #[error("{0}")]
    Config(String),

    #[error("Failed to parse {}: {message}", .path.display())]
    MalformedProperties { path: PathBuf, message: String },

    /// A declaration line is not `source -> target`.
    #[error("Error in line {line}: '{content}' is not in the correct 'source -> target' format")]
    Format { line: usize, content: String },

    #[error("Source file does not exist: {}", .0.display())]
    MissingSource(PathBuf),

    /// The target exists and is a regular file or directory.
    #[error("Target is not a symbolic link: {}", .0.display())]
    Conflict(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Adapter for `map_err` that attaches the path an I/O call was working on.
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> SyncError + '_ {
        move |source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
