use crate::candidate::CandidatePath;
use crate::ignore::RuleSet;
use std::path::Path;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Lazily walks `root` depth-first, yielding every regular file that is not
/// hidden and not inside an ignored directory. Ignored directories are never
/// entered. Symlinked directories are not followed; symlinked files are
/// yielded like regular files.
///
/// Files themselves are not checked against `rules` here; see
/// [`crate::selection::select_from_walk`].
pub fn walk<'a>(root: &'a Path, rules: &'a RuleSet) -> impl Iterator<Item = CandidatePath> + 'a {
    debug!("Walking {}", root.display());
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| keep_entry(root, rules, entry))
        .filter_map(move |entry| match entry {
            Ok(entry) => candidate_file(root, &entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
}

fn keep_entry(root: &Path, rules: &RuleSet, entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if is_hidden(entry) {
        trace!("Skipping hidden entry: {}", entry.path().display());
        return false;
    }
    if entry.file_type().is_dir() {
        if let Some(candidate) = relative_candidate(root, entry) {
            if rules.matches(&candidate, true) {
                debug!("Pruning ignored directory: {}", candidate);
                return false;
            }
        }
    }
    true
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn candidate_file(root: &Path, entry: &DirEntry) -> Option<CandidatePath> {
    let file_type = entry.file_type();
    let is_file = if file_type.is_symlink() {
        std::fs::metadata(entry.path())
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    } else {
        file_type.is_file()
    };
    if !is_file {
        return None;
    }

    let candidate = relative_candidate(root, entry);
    if candidate.is_none() {
        warn!("Skipping path that is not valid UTF-8: {}", entry.path().display());
    }
    candidate
}

fn relative_candidate(root: &Path, entry: &DirEntry) -> Option<CandidatePath> {
    let relative = entry.path().strip_prefix(root).ok()?;
    CandidatePath::from_relative(relative)
}
