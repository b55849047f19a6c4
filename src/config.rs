use crate::errors::PackError;
use std::path::PathBuf;

/// Ignore file picked up from the project root when none is given.
pub const DEFAULT_IGNORE_FILE: &str = ".llmignore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Walk the root directory.
    Walk,
    /// Ask git for tracked and untracked, non-ignored files.
    Git,
    /// Use these paths as given.
    Explicit(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A timestamped `.md` file inside this directory.
    Directory(PathBuf),
    File(PathBuf),
    Stdout,
    Clipboard,
}

#[derive(Debug, Clone)]
pub struct PackConfig {
    pub root: PathBuf,
    pub ignore_file: Option<PathBuf>,
    pub use_default_ignores: bool,
    pub source: FileSource,
    pub output: OutputTarget,
    pub verbose: bool,
    pub dry_run: bool,
}

impl PackConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackConfig {
            root: root.into(),
            ignore_file: None,
            use_default_ignores: false,
            source: FileSource::Walk,
            output: OutputTarget::Directory(PathBuf::from(".")),
            verbose: false,
            dry_run: false,
        }
    }

    pub fn validate(&self) -> Result<(), PackError> {
        if !self.root.exists() {
            return Err(PackError::ConfigError(format!(
                "project root {} does not exist",
                self.root.display()
            )));
        }
        if !self.root.is_dir() {
            return Err(PackError::ConfigError(format!(
                "project root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    /// The explicit ignore file, else `.llmignore` under the root if present.
    pub fn resolved_ignore_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.ignore_file {
            return Some(path.clone());
        }
        let fallback = self.root.join(DEFAULT_IGNORE_FILE);
        fallback.is_file().then_some(fallback)
    }
}
