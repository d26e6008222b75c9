//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,

    /// Failed to get the current working directory.
    #[error("Cannot determine current directory: {0}")]
    CurrentDirError(String),

    /// Failed to locate the running executable.
    #[error("Cannot determine executable location: {0}")]
    ExecutableError(String),

    /// A resource directory was expected but is missing.
    #[error("Resource directory {0} does not exist")]
    ResourceDirNotFound(PathBuf),
}
