//! Error types for repository operations

use crate::object::ObjectId;
use crate::storage::StorageError;
use std::path::PathBuf;

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

/// Errors reported by repository operations.
///
/// Everything except `Storage`, `CorruptObject`, `Io` and `Serialization` is
/// a user-facing condition that leaves the repository unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("No commit with that id exists.")]
    NoSuchCommit(String),

    #[error("Invalid commit id '{0}': expected at least {1} hexadecimal characters.")]
    InvalidId(String, usize),

    #[error("Commit id '{prefix}' is ambiguous: {matches} commits match.")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("Object {0} is not a commit.")]
    CorruptObject(ObjectId),

    #[error("File does not exist.")]
    FileNotFound(String),

    #[error("No reason to remove the file.")]
    NothingToRemove(String),

    #[error("No changes added to the commit.")]
    EmptyCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("Not in an initialized mygit directory.")]
    NotInitialized(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for RepoError {
    fn from(e: bincode::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}
