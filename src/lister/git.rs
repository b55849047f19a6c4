use super::FileLister;
use crate::errors::EnumerationError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Lists tracked files plus untracked files that git does not ignore.
#[derive(Debug, Clone)]
pub struct GitFileLister {
    repo_path: PathBuf,
}

impl GitFileLister {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        GitFileLister {
            repo_path: repo_path.into(),
        }
    }
}

#[async_trait]
impl FileLister for GitFileLister {
    async fn list(&self) -> Result<Vec<String>, EnumerationError> {
        if !self.repo_path.join(".git").exists() {
            return Err(EnumerationError::NotARepository(self.repo_path.clone()));
        }

        debug!("Running git ls-files in {}", self.repo_path.display());
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_path)
            .args(["ls-files", "-z", "--cached", "--others", "--exclude-standard"])
            .output()
            .await
            .map_err(|e| EnumerationError::Unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(EnumerationError::CommandFailed {
                code: output
                    .status
                    .code()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "signal".to_owned()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| EnumerationError::InvalidOutput)?;
        let files: Vec<String> = stdout
            .split('\0')
            .filter(|entry| !entry.is_empty())
            .map(str::to_owned)
            .collect();

        if files.is_empty() {
            return Err(EnumerationError::EmptyOutput);
        }
        debug!("git listed {} files", files.len());
        Ok(files)
    }
}
