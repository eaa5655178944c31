//! Error types for dirloclib

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during LOC counting
#[derive(Error, Debug)]
pub enum DirlocError {
    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but cannot be read by the current user
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A directory target turned out to be something else
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to list a directory
    #[error("failed to read directory '{path}': {source}")]
    DirRead { path: PathBuf, source: io::Error },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Malformed comment-style table or pattern file
    #[error("invalid configuration in {origin}: {message}")]
    Config { origin: String, message: String },
}

impl DirlocError {
    /// Classify an I/O failure that happened while reading a file.
    pub fn file_read(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => DirlocError::PathNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DirlocError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DirlocError::FileRead {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Classify an I/O failure that happened while listing a directory.
    pub fn dir_read(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => DirlocError::PathNotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DirlocError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DirlocError::DirRead {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Build a configuration error.
    pub fn config(origin: impl Into<String>, message: impl ToString) -> Self {
        DirlocError::Config {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error means the target was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirlocError::PathNotFound(_))
    }
}
