//! Disk-persistent object store
//!
//! Stores objects on disk in a bucketed, content-addressed directory
//! (like git objects):
//! ```text
//! objects/{hash[0..2]}/{hash[2..]}
//! ```
//! All 256 buckets are created at initialization; nothing is created lazily.

use crate::object::ObjectId;
use crate::storage::{ObjectStore, Result, StorageError};
use bytes::Bytes;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const TMP_SUFFIX: &str = ".tmp";

/// Object store rooted at an `objects/` directory
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open an existing store
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Create the store directory and every bucket
    pub fn init(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        for byte in 0..=u8::MAX {
            fs::create_dir_all(root.join(hex::encode([byte])))?;
        }
        tracing::debug!("Created object store buckets under {:?}", root);
        Ok(Self::open(root))
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.bucket()).join(id.object_name())
    }
}

impl ObjectStore for DiskStore {
    fn get(&self, id: &ObjectId) -> Result<Bytes> {
        match fs::read(self.object_path(id)) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn put(&self, data: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::from_data(data);
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id); // Already stored (content-addressed = idempotent)
        }
        // Write atomically via temp file
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &path)?;
        tracing::debug!("Stored object {} ({} bytes)", id, data.len());
        Ok(id)
    }

    fn bucket_entries(&self, bucket: &str) -> Result<Vec<String>> {
        let dir = self.root.join(bucket);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if !name.ends_with(TMP_SUFFIX) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn put_file(&self, path: &Path) -> Result<ObjectId> {
        let data = fs::read(path)?;
        let id = ObjectId::from_data(&data);
        let dest = self.object_path(&id);
        if dest.exists() {
            fs::remove_file(path)?;
        } else {
            fs::rename(path, &dest)?;
            tracing::debug!("Moved {:?} into object {}", path, id);
        }
        Ok(id)
    }
}
