//! Core object model for mygit
//!
//! Content addresses, tracked file entries and the commit record.
//! A commit is built without an identity ([`CommitData`]), serialized,
//! hashed by the object store, and only then wrapped with its address
//! ([`Commit`]). The address is never recomputed once attached.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fmt;

/// Length of a digest in bytes (SHA-1)
pub const DIGEST_LEN: usize = 20;

/// Length of a digest rendered as hex
pub const HEX_LEN: usize = DIGEST_LEN * 2;

/// Number of leading hex characters selecting a storage bucket
pub const BUCKET_LEN: usize = 2;

/// Header written in front of every serialized commit
pub const COMMIT_MAGIC: &[u8] = b"mygit-commit\0";

/// Display pattern for commit timestamps
pub const TIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";

/// Message of the root commit created by `init`
pub const ROOT_MESSAGE: &str = "initial commit";

/// Content address of any stored object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; DIGEST_LEN]);

impl ObjectId {
    /// Create a new ObjectId from raw bytes
    pub fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Compute ObjectId from data
    pub fn from_data(data: &[u8]) -> Self {
        let hash = Sha1::digest(data);
        Self(hash.into())
    }

    /// Convert to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a full-length hexadecimal string
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != DIGEST_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; DIGEST_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Bucket directory name (first two hex characters)
    pub fn bucket(&self) -> String {
        let hex = self.to_hex();
        hex[..BUCKET_LEN].to_string()
    }

    /// File name inside the bucket (remaining hex characters)
    pub fn object_name(&self) -> String {
        let hex = self.to_hex();
        hex[BUCKET_LEN..].to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

/// A tracked file: the digest of its contents plus its name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    pub id: ObjectId,
    pub name: String,
}

impl FileEntry {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Composite storage key: `hex(digest) + name`
    pub fn composite_key(&self) -> String {
        format!("{}{}", self.id.to_hex(), self.name)
    }
}

/// Resolved file set of a commit: each tracked name maps to one digest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    /// Sorted by name for deterministic hashing
    entries: BTreeMap<String, ObjectId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing whatever digest the name had before
    pub fn insert(&mut self, entry: FileEntry) -> Option<ObjectId> {
        self.entries.insert(entry.name, entry.id)
    }

    pub fn remove(&mut self, name: &str) -> Option<ObjectId> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.entries.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True when `name` is tracked under exactly `id`
    pub fn contains_exact(&self, name: &str, id: &ObjectId) -> bool {
        self.entries.get(name) == Some(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = FileEntry> + '_ {
        self.entries
            .iter()
            .map(|(name, id)| FileEntry::new(*id, name.clone()))
    }
}

impl FromIterator<FileEntry> for FileSet {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

/// Changes to apply to a parent's file set when building a child commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSetDelta {
    /// Entries to insert; an existing entry for the same name is dropped first
    pub additions: Vec<FileEntry>,
    /// Names to drop, applied after the additions
    pub removals: Vec<String>,
}

impl FileSetDelta {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn apply_to(&self, files: &mut FileSet) {
        for entry in &self.additions {
            files.insert(entry.clone());
        }
        for name in &self.removals {
            files.remove(name);
        }
    }
}

/// Commit fields without the commit's own address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    /// Commit message
    pub message: String,
    /// Creation time formatted for display
    pub time: String,
    /// Creation time as Unix milliseconds
    pub timestamp_ms: i64,
    /// Address of the predecessor (none for the root commit)
    pub parent: Option<ObjectId>,
    /// Resolved file set
    pub files: FileSet,
}

impl CommitData {
    /// Create a commit record stamped with `when`
    pub fn new<Tz: TimeZone>(
        message: impl Into<String>,
        when: &DateTime<Tz>,
        parent: Option<ObjectId>,
        files: FileSet,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            message: message.into(),
            time: when.format(TIME_FORMAT).to_string(),
            timestamp_ms: when.timestamp_millis(),
            parent,
            files,
        }
    }

    /// The root commit: epoch timestamp in UTC, no parent, no files
    pub fn root() -> Self {
        Self::new(ROOT_MESSAGE, &DateTime::<Utc>::UNIX_EPOCH, None, FileSet::new())
    }

    /// Serialize to the stored format (magic header + bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        let body = bincode::serialize(self)?;
        let mut data = Vec::with_capacity(COMMIT_MAGIC.len() + body.len());
        data.extend_from_slice(COMMIT_MAGIC);
        data.extend_from_slice(&body);
        Ok(data)
    }

    /// Deserialize from the stored format
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        let body = data.strip_prefix(COMMIT_MAGIC).ok_or_else(|| {
            Box::new(bincode::ErrorKind::Custom("missing commit header".to_string()))
        })?;
        bincode::deserialize(body)
    }

    /// Whether stored bytes look like a commit rather than a file blob
    pub fn is_commit(data: &[u8]) -> bool {
        data.starts_with(COMMIT_MAGIC)
    }
}

/// An immutable, persisted commit together with its address
#[derive(Debug, Clone)]
pub struct Commit {
    id: ObjectId,
    data: CommitData,
}

impl Commit {
    /// Attach an address to commit data. `id` must be the address the
    /// serialized `data` was stored under.
    pub(crate) fn new(id: ObjectId, data: CommitData) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.data.message
    }

    pub fn time(&self) -> &str {
        &self.data.time
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.data.timestamp_ms
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.data.parent
    }

    pub fn files(&self) -> &FileSet {
        &self.data.files
    }

    pub fn data(&self) -> &CommitData {
        &self.data
    }

    /// Check if this is the root commit (no parent)
    pub fn is_root(&self) -> bool {
        self.data.parent.is_none()
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}
