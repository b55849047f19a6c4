use crate::errors::EnumerationError;
use async_trait::async_trait;

pub mod git;

pub use git::GitFileLister;

/// Enumerates candidate files for a run. Any failure is fatal to the run.
#[async_trait]
pub trait FileLister: Send + Sync {
    async fn list(&self) -> Result<Vec<String>, EnumerationError>;
}

/// Paths supplied directly by the caller, absolute or root-relative.
#[derive(Debug, Clone, Default)]
pub struct ExplicitFileList {
    paths: Vec<String>,
}

impl ExplicitFileList {
    pub fn new(paths: Vec<String>) -> Self {
        ExplicitFileList { paths }
    }
}

#[async_trait]
impl FileLister for ExplicitFileList {
    async fn list(&self) -> Result<Vec<String>, EnumerationError> {
        if self.paths.is_empty() {
            return Err(EnumerationError::EmptyOutput);
        }
        Ok(self.paths.clone())
    }
}
