//! Repository state persisted between invocations.
//!
//! Holds the head commit address and the pending-removal set. Every command
//! loads it, mutates it, and saves it back; there is no process-wide copy.

use crate::error::Result;
use crate::object::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Head pointer plus names marked for removal at the next commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoState {
    /// Address of the current head commit
    pub head: ObjectId,
    /// Tracked names to drop from the next commit
    pub removals: BTreeSet<String>,
}

impl RepoState {
    pub fn new(head: ObjectId) -> Self {
        Self {
            head,
            removals: BTreeSet::new(),
        }
    }

    /// Load state from a file (bincode)
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }

    /// Save state atomically (temp file + rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let data = bincode::serialize(self)?;
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Mark a name for removal. Returns false if it was already marked.
    pub fn mark_removed(&mut self, name: &str) -> bool {
        self.removals.insert(name.to_string())
    }

    /// Cancel a pending removal. Returns true if one existed.
    pub fn cancel_removal(&mut self, name: &str) -> bool {
        self.removals.remove(name)
    }

    pub fn is_removed(&self, name: &str) -> bool {
        self.removals.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_persistence() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("repo");

        let mut state = RepoState::new(ObjectId::from_data(b"head"));
        state.mark_removed("a.txt");
        state.save(&path).unwrap();

        let loaded = RepoState::load(&path).unwrap();
        assert_eq!(loaded, state);
        assert!(loaded.is_removed("a.txt"));
        assert!(!tmp.path().join("repo.tmp").exists());
    }

    #[test]
    fn test_removal_marks() {
        let mut state = RepoState::new(ObjectId::from_data(b"head"));
        assert!(state.mark_removed("a.txt"));
        assert!(!state.mark_removed("a.txt"));
        assert!(state.cancel_removal("a.txt"));
        assert!(!state.cancel_removal("a.txt"));
        assert!(state.removals.is_empty());
    }
}
