use crate::utils::extension_tag;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A root-relative path with `/` separators. Never absolute, never empty,
/// never escapes the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidatePath(String);

impl CandidatePath {
    /// Normalizes a relative path string. Returns `None` for absolute paths,
    /// empty paths and paths whose `..` components climb above the root.
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.replace('\\', "/");
        if raw.starts_with('/') || Path::new(&raw).is_absolute() {
            return None;
        }

        let mut parts: Vec<&str> = Vec::new();
        for part in raw.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop()?;
                }
                other => parts.push(other),
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(CandidatePath(parts.join("/")))
        }
    }

    /// Accepts either a root-relative path or an absolute path under `root`.
    pub fn from_root(root: &Path, path: &Path) -> Option<Self> {
        if !path.is_absolute() {
            return Self::from_relative(path);
        }

        match path.strip_prefix(root) {
            Ok(rest) => Self::from_relative(rest),
            Err(_) => {
                let canonical_root = root.canonicalize().ok()?;
                let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
                Self::from_relative(canonical_path.strip_prefix(&canonical_root).ok()?)
            }
        }
    }

    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::ParentDir => parts.push(".."),
                Component::CurDir => {}
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Self::new(&parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').collect()
    }

    pub fn extension(&self) -> String {
        extension_tag(&self.0)
    }

    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for CandidatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
