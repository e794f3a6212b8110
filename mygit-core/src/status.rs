//! Three-way status: working directory vs staging area vs head commit.

use crate::object::{FileSet, ObjectId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Kind of change not yet staged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstagedKind {
    Modified,
    Deleted,
}

impl fmt::Display for UnstagedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnstagedKind::Modified => write!(f, "modified"),
            UnstagedKind::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnstagedChange {
    pub name: String,
    pub kind: UnstagedKind,
}

impl UnstagedChange {
    fn new(name: &str, kind: UnstagedKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Status report. The views are independent: one name may appear in more
/// than one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Names with a staged copy
    pub staged: Vec<String>,
    /// Names pending removal at the next commit
    pub removed: Vec<String>,
    /// Changes in the working directory that are not staged
    pub unstaged: Vec<UnstagedChange>,
    /// Working files neither committed nor staged
    pub untracked: Vec<String>,
}

impl Status {
    /// Classify every name from the three digest views.
    ///
    /// `staged` and `working` map names to the digest of the staged copy and
    /// the working file respectively.
    pub fn compute(
        committed: &FileSet,
        staged: &BTreeMap<String, ObjectId>,
        working: &BTreeMap<String, ObjectId>,
        removals: &BTreeSet<String>,
    ) -> Self {
        let mut unstaged = Vec::new();
        for (name, current) in working {
            let changed_since_commit = !staged.contains_key(name)
                && committed.get(name).is_some_and(|id| id != *current);
            let changed_since_staging = staged.get(name).is_some_and(|id| id != current);
            if changed_since_commit || changed_since_staging {
                unstaged.push(UnstagedChange::new(name, UnstagedKind::Modified));
            }
        }
        for name in staged.keys() {
            if !working.contains_key(name) {
                unstaged.push(UnstagedChange::new(name, UnstagedKind::Deleted));
            }
        }
        for name in committed.names() {
            if !removals.contains(name) && !working.contains_key(name) && !staged.contains_key(name)
            {
                unstaged.push(UnstagedChange::new(name, UnstagedKind::Deleted));
            }
        }
        unstaged.sort_by(|a, b| a.name.cmp(&b.name));

        let untracked = working
            .keys()
            .filter(|name| !committed.contains_name(name) && !staged.contains_key(*name))
            .cloned()
            .collect();

        Self {
            staged: staged.keys().cloned().collect(),
            removed: removals.iter().cloned().collect(),
            unstaged,
            untracked,
        }
    }

    /// Nothing staged, nothing pending, no unstaged edits, no untracked files
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}
