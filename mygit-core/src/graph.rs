//! Commit graph: immutable commits linked to their parent by address.
//!
//! Commits live in the object store next to file blobs. A commit is only
//! ever created by [`CommitGraph::create_root`] or [`CommitGraph::append`];
//! both serialize the identity-less [`CommitData`] and take the address the
//! store computes for those bytes.

use crate::config::{RepoConfig, MIN_PREFIX_LEN};
use crate::error::{RepoError, Result};
use crate::object::{Commit, CommitData, FileSetDelta, ObjectId, BUCKET_LEN, HEX_LEN};
use crate::storage::ObjectStore;
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

/// How abbreviated commit ids are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Shortest accepted prefix
    pub min_prefix_len: usize,
    /// Fail on more than one match instead of taking the first
    pub strict: bool,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            min_prefix_len: MIN_PREFIX_LEN,
            strict: false,
        }
    }
}

impl From<&RepoConfig> for LookupPolicy {
    fn from(config: &RepoConfig) -> Self {
        Self {
            min_prefix_len: config.prefix_len(),
            strict: config.strict_prefix_lookup,
        }
    }
}

/// View over the commits held in an object store
#[derive(Clone, Copy)]
pub struct CommitGraph<'a> {
    store: &'a dyn ObjectStore,
    policy: LookupPolicy,
}

impl<'a> CommitGraph<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self {
            store,
            policy: LookupPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Persist commit data and attach the resulting address
    fn persist(&self, data: CommitData) -> Result<Commit> {
        let bytes = data.to_bytes()?;
        let id = self.store.put(&bytes)?;
        Ok(Commit::new(id, data))
    }

    /// Build and store the root commit. Storing it again is a no-op and
    /// yields the same address.
    pub fn create_root(&self) -> Result<ObjectId> {
        let root = self.persist(CommitData::root())?;
        tracing::debug!("Root commit {}", root.id());
        Ok(root.id())
    }

    /// Load a commit by its full address
    pub fn load(&self, id: &ObjectId) -> Result<Commit> {
        let bytes = self.store.get(id)?;
        let data = CommitData::from_bytes(&bytes).map_err(|_| RepoError::CorruptObject(*id))?;
        Ok(Commit::new(*id, data))
    }

    /// Find the commit whose address starts with `id`.
    ///
    /// Only the bucket named by the first two characters is searched. Without
    /// a strict policy the first match in lexical order wins.
    pub fn resolve(&self, id: &str) -> Result<Commit> {
        let prefix = id.trim().to_ascii_lowercase();
        let min_len = self.policy.min_prefix_len.max(BUCKET_LEN + 1);
        if prefix.len() < min_len || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RepoError::InvalidId(id.to_string(), min_len));
        }
        if prefix.len() > HEX_LEN {
            return Err(RepoError::NoSuchCommit(id.to_string()));
        }

        let (bucket, rest) = prefix.split_at(BUCKET_LEN);
        let mut found: Option<Commit> = None;
        let mut matches = 0usize;
        for name in self.store.bucket_entries(bucket)? {
            if !name.starts_with(rest) {
                continue;
            }
            let Ok(candidate) = ObjectId::from_hex(&format!("{}{}", bucket, name)) else {
                continue;
            };
            let bytes = self.store.get(&candidate)?;
            if !CommitData::is_commit(&bytes) {
                continue;
            }
            matches += 1;
            if found.is_none() {
                let data = CommitData::from_bytes(&bytes)
                    .map_err(|_| RepoError::CorruptObject(candidate))?;
                found = Some(Commit::new(candidate, data));
            }
            if !self.policy.strict {
                break;
            }
        }

        if matches > 1 {
            return Err(RepoError::AmbiguousId {
                prefix,
                matches,
            });
        }
        tracing::debug!("Resolved '{}' to {:?}", id, found.as_ref().map(Commit::id));
        found.ok_or_else(|| RepoError::NoSuchCommit(id.to_string()))
    }

    /// Create a child of `parent` stamped with the current local time
    pub fn append(&self, parent: &ObjectId, message: &str, delta: &FileSetDelta) -> Result<Commit> {
        self.append_at(parent, message, delta, &Local::now())
    }

    /// Create a child of `parent`: copy its file set, apply `delta`, persist.
    pub fn append_at<Tz: TimeZone>(
        &self,
        parent: &ObjectId,
        message: &str,
        delta: &FileSetDelta,
        when: &DateTime<Tz>,
    ) -> Result<Commit>
    where
        Tz::Offset: fmt::Display,
    {
        let parent = self.load(parent)?;
        let mut files = parent.files().clone();
        delta.apply_to(&mut files);

        let commit = self.persist(CommitData::new(message, when, Some(parent.id()), files))?;
        tracing::debug!(
            "Commit {} (parent {}, {} files)",
            commit.id(),
            parent.id(),
            commit.files().len()
        );
        Ok(commit)
    }

    /// Walk from `head` to the root, inclusive. Each call starts a fresh walk.
    pub fn history(&self, head: ObjectId) -> History<'a> {
        History {
            graph: *self,
            next: Some(head),
        }
    }

    /// All commits reachable from `head` whose message equals `message`,
    /// newest first
    pub fn find_by_message(&self, head: ObjectId, message: &str) -> Result<Vec<ObjectId>> {
        let mut found = Vec::new();
        for commit in self.history(head) {
            let commit = commit?;
            if commit.message() == message {
                found.push(commit.id());
            }
        }
        Ok(found)
    }
}

/// Lazy walk over parent links
pub struct History<'a> {
    graph: CommitGraph<'a>,
    next: Option<ObjectId>,
}

impl Iterator for History<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.graph.load(&id) {
            Ok(commit) => {
                self.next = commit.parent();
                Some(Ok(commit))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
