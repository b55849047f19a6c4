use crate::candidate::CandidatePath;
use crate::ignore::RuleSet;
use crate::walk::walk;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// The files chosen for one run, already in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    included: BTreeSet<CandidatePath>,
    excluded: BTreeSet<CandidatePath>,
}

impl SelectionResult {
    fn record(&mut self, path: CandidatePath, rules: &RuleSet) {
        if rules.matches(&path, false) {
            debug!("Excluded by ignore rules: {}", path);
            self.excluded.insert(path);
        } else {
            self.included.insert(path);
        }
    }

    /// Included paths in lexicographic order.
    pub fn included(&self) -> impl Iterator<Item = &CandidatePath> {
        self.included.iter()
    }

    pub fn excluded(&self) -> impl Iterator<Item = &CandidatePath> {
        self.excluded.iter()
    }

    pub fn included_count(&self) -> usize {
        self.included.len()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}

/// Walks `root`, pruning ignored directories, then checks each file.
pub fn select_from_walk(root: &Path, rules: &RuleSet) -> SelectionResult {
    let mut selection = SelectionResult::default();
    for candidate in walk(root, rules) {
        selection.record(candidate, rules);
    }
    debug!(
        "Selected {} files, excluded {}",
        selection.included_count(),
        selection.excluded_count()
    );
    selection
}

/// Normalizes caller- or lister-supplied paths and checks each one
/// individually. No directory pruning happens in this mode.
pub fn select_from_list<S: AsRef<str>>(root: &Path, paths: &[S], rules: &RuleSet) -> SelectionResult {
    let mut selection = SelectionResult::default();
    for raw in paths {
        match normalize_candidate(root, raw.as_ref()) {
            Some(candidate) => selection.record(candidate, rules),
            None => warn!("Skipping path outside the project root: {}", raw.as_ref()),
        }
    }
    debug!(
        "Selected {} of {} listed files",
        selection.included_count(),
        paths.len()
    );
    selection
}

pub fn normalize_candidate(root: &Path, raw: &str) -> Option<CandidatePath> {
    CandidatePath::from_root(root, Path::new(raw))
}
