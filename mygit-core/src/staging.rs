//! Staging container: raw copies of working files awaiting the next commit.
//!
//! The pending-removal half of the staging area lives in
//! [`RepoState`](crate::state::RepoState) since it is persisted with the head.

use crate::error::Result;
use crate::object::{FileEntry, ObjectId};
use crate::storage::ObjectStore;
use crate::worktree::{digest_file, is_plain_name, plain_files, remove_if_exists};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory of staged file copies, keyed by file name
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Create the staging directory
    pub fn init(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self::new(dir))
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Copy `source` into the staging area as `name`, replacing any prior copy
    pub fn stage(&self, name: &str, source: &Path) -> Result<()> {
        fs::copy(source, self.path(name))?;
        tracing::debug!("Staged {}", name);
        Ok(())
    }

    /// Drop the staged copy of `name`. Returns true if one existed.
    pub fn unstage(&self, name: &str) -> Result<bool> {
        if !is_plain_name(name) {
            return Ok(false);
        }
        remove_if_exists(&self.path(name))
    }

    /// Staged names in lexicographic order
    pub fn names(&self) -> Result<Vec<String>> {
        plain_files(&self.dir)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.names()?.is_empty())
    }

    /// Digest of every staged copy, keyed by name
    pub fn snapshot(&self) -> Result<BTreeMap<String, ObjectId>> {
        let mut digests = BTreeMap::new();
        for name in self.names()? {
            let id = digest_file(&self.path(&name))?;
            digests.insert(name, id);
        }
        Ok(digests)
    }

    /// Move every staged copy into `store`, leaving the staging area empty.
    /// Returns the resulting entries in name order.
    pub fn drain_into(&self, store: &dyn ObjectStore) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for name in self.names()? {
            let id = store.put_file(&self.path(&name))?;
            entries.push(FileEntry::new(id, name));
        }
        Ok(entries)
    }

    /// Remove every staged copy
    pub fn clear(&self) -> Result<()> {
        for name in self.names()? {
            remove_if_exists(&self.path(&name))?;
        }
        Ok(())
    }
}
