use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File listing failed: {0}")]
    ListingError(#[from] EnumerationError),

    #[error("Output write failed: {0}")]
    OutputError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardError(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

/// Failures of a [`FileLister`](crate::lister::FileLister). Always fatal.
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("{} is not a git repository", .0.display())]
    NotARepository(PathBuf),

    #[error("file lister unavailable: {0}")]
    Unavailable(String),

    #[error("file lister exited with {code}: {stderr}")]
    CommandFailed { code: String, stderr: String },

    #[error("file lister returned no files")]
    EmptyOutput,

    #[error("file lister output is not valid UTF-8")]
    InvalidOutput,
}

/// A per-file failure recorded in the run report. Never aborts a run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ReadError {
    #[error("non-UTF-8")]
    NonUtf8,

    #[error("Error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        ReadError::Io(err.to_string())
    }
}
