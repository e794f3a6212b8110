//! Working directory access
//!
//! Only plain files directly inside a directory are considered; nested
//! directories (including `.mygit`) are ignored.

use crate::error::Result;
use crate::object::ObjectId;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Names of the plain files in `dir`, sorted lexicographically
pub fn plain_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Whether `name` can denote a file directly inside a directory
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

/// Digest of a file's contents
pub fn digest_file(path: &Path) -> Result<ObjectId> {
    let data = fs::read(path)?;
    Ok(ObjectId::from_data(&data))
}

/// Remove a file, reporting whether it existed
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// The user's working directory
#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        is_plain_name(name) && self.path(name).is_file()
    }

    pub fn files(&self) -> Result<Vec<String>> {
        plain_files(&self.root)
    }

    pub fn digest(&self, name: &str) -> Result<ObjectId> {
        digest_file(&self.path(name))
    }

    /// Digest of every working file, keyed by name
    pub fn snapshot(&self) -> Result<BTreeMap<String, ObjectId>> {
        let mut digests = BTreeMap::new();
        for name in self.files()? {
            let id = self.digest(&name)?;
            digests.insert(name, id);
        }
        Ok(digests)
    }

    /// Delete a working file. Returns false if it was already gone.
    pub fn remove(&self, name: &str) -> Result<bool> {
        if !is_plain_name(name) {
            return Ok(false);
        }
        remove_if_exists(&self.path(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_files_sorted_and_flat() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/c.txt"), "c").unwrap();

        let tree = WorkTree::new(tmp.path());
        assert_eq!(tree.files().unwrap(), vec!["a.txt", "b.txt"]);
        assert!(tree.contains("a.txt"));
        assert!(!tree.contains("sub"));
        assert!(!tree.contains("sub/c.txt"));
    }

    #[test]
    fn test_plain_names() {
        assert!(is_plain_name("a.txt"));
        assert!(is_plain_name(".hidden"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("../a.txt"));
    }

    #[test]
    fn test_snapshot_and_remove() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "hello").unwrap();
        let tree = WorkTree::new(tmp.path());

        let snapshot = tree.snapshot().unwrap();
        assert_eq!(snapshot.get("a.txt"), Some(&ObjectId::from_data(b"hello")));

        assert!(tree.remove("a.txt").unwrap());
        assert!(!tree.remove("a.txt").unwrap());
        assert!(tree.files().unwrap().is_empty());
    }
}
