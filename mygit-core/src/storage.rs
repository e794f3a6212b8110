//! Storage abstraction layer for mygit
//!
//! Content-addressed object storage. Objects are immutable and named by the
//! SHA-1 of their bytes, so writing the same bytes twice is a no-op.

use bytes::Bytes;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::object::{ObjectId, BUCKET_LEN};

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(ObjectId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Generic object store interface
pub trait ObjectStore {
    /// Get object data by ID
    fn get(&self, id: &ObjectId) -> Result<Bytes>;

    /// Check if object exists
    fn contains(&self, id: &ObjectId) -> Result<bool>;

    /// Put object data (returns the object ID). Idempotent.
    fn put(&self, data: &[u8]) -> Result<ObjectId>;

    /// Object names stored in a bucket, in lexicographic order.
    ///
    /// `bucket` is the two-character hex prefix; returned names are the
    /// remaining characters of each address.
    fn bucket_entries(&self, bucket: &str) -> Result<Vec<String>>;

    /// Move the file at `path` into the store. The source file is consumed.
    fn put_file(&self, path: &Path) -> Result<ObjectId> {
        let data = fs::read(path)?;
        let id = self.put(&data)?;
        fs::remove_file(path)?;
        Ok(id)
    }
}

/// In-memory object store
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<ObjectId, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.borrow().is_empty()
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, id: &ObjectId) -> Result<Bytes> {
        self.objects
            .borrow()
            .get(id)
            .cloned()
            .ok_or(StorageError::NotFound(*id))
    }

    fn contains(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.objects.borrow().contains_key(id))
    }

    fn put(&self, data: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::from_data(data);
        self.objects
            .borrow_mut()
            .entry(id)
            .or_insert_with(|| Bytes::copy_from_slice(data));
        Ok(id)
    }

    fn bucket_entries(&self, bucket: &str) -> Result<Vec<String>> {
        // BTreeMap order over raw bytes matches hex order
        Ok(self
            .objects
            .borrow()
            .keys()
            .map(ObjectId::to_hex)
            .filter(|hex| &hex[..BUCKET_LEN] == bucket)
            .map(|hex| hex[BUCKET_LEN..].to_string())
            .collect())
    }
}
