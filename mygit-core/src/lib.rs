//! mygit Core Library
//!
//! Core functionality for a single-user, local version control system:
//! - Object model (content addresses, file sets, commits)
//! - Content-addressed object store (bucketed on disk, or in memory)
//! - Commit graph with abbreviated-id lookup and history walks
//! - Staging area and persisted repository state
//! - Comparison engine (status, file-set diff, line diff)

pub mod config;
pub mod diff;
pub mod disk_store;
pub mod error;
pub mod graph;
pub mod history_log;
pub mod object;
pub mod repository;
pub mod staging;
pub mod state;
pub mod status;
pub mod storage;
pub mod worktree;

pub use config::RepoConfig;
pub use diff::{diff_file_sets, line_diff, CommitDiff, FileChange, FileDiff, LineChange};
pub use disk_store::DiskStore;
pub use error::{RepoError, Result};
pub use graph::{CommitGraph, History, LookupPolicy};
pub use history_log::{format_entry, HistoryLog};
pub use object::{Commit, CommitData, FileEntry, FileSet, FileSetDelta, ObjectId};
pub use repository::{AddOutcome, Repository, REPO_DIR};
pub use state::RepoState;
pub use status::{Status, UnstagedChange, UnstagedKind};
pub use storage::{MemoryStore, ObjectStore, StorageError};
