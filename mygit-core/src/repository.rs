//! Repository operations
//!
//! A [`Repository`] holds the on-disk layout of one working directory. The
//! mutable part, [`RepoState`], is passed explicitly: callers load it at
//! command start, hand it to the operation, and save it at command end.
//!
//! Layout on disk:
//! ```text
//! {root}/
//!   .mygit/
//!     objects/{hash[0..2]}/{hash[2..]}  content-addressed blobs and commits
//!     staging/{name}                   copies awaiting the next commit
//!     repo                             head + pending removals (bincode)
//!     log                              human-readable history, newest first
//!     config.json                      repository configuration
//! ```

use crate::config::RepoConfig;
use crate::diff::{diff_file_sets, line_diff, CommitDiff, FileChange, FileDiff};
use crate::disk_store::DiskStore;
use crate::error::{RepoError, Result};
use crate::graph::{CommitGraph, History, LookupPolicy};
use crate::history_log::HistoryLog;
use crate::object::{Commit, FileSetDelta, ObjectId};
use crate::staging::StagingArea;
use crate::state::RepoState;
use crate::status::Status;
use crate::storage::ObjectStore;
use crate::worktree::WorkTree;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the repository directory inside the working directory
pub const REPO_DIR: &str = ".mygit";

const OBJECTS_DIR: &str = "objects";
const STAGING_DIR: &str = "staging";
const STATE_FILE: &str = "repo";
const LOG_FILE: &str = "log";

/// What `add` did with a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Working copy differs from the head; it was copied into staging
    Staged,
    /// Working copy matches the head; any staged copy or removal was dropped
    Unchanged,
    /// Tracked file missing from the working directory; marked for removal
    MarkedRemoved,
}

/// A mygit repository rooted at a working directory
pub struct Repository {
    dir: PathBuf,
    store: DiskStore,
    staging: StagingArea,
    work: WorkTree,
    log: HistoryLog,
    config: RepoConfig,
}

impl Repository {
    fn layout(root: &Path, config: RepoConfig) -> Self {
        let dir = root.join(REPO_DIR);
        Self {
            store: DiskStore::open(&dir.join(OBJECTS_DIR)),
            staging: StagingArea::new(&dir.join(STAGING_DIR)),
            work: WorkTree::new(root),
            log: HistoryLog::new(&dir.join(LOG_FILE)),
            dir,
            config,
        }
    }

    /// Whether `root` holds an initialized repository
    pub fn is_initialized(root: &Path) -> bool {
        root.join(REPO_DIR).join(STATE_FILE).is_file()
    }

    /// Initialize a repository in `root`. Idempotent: an existing repository
    /// is opened unchanged.
    pub fn init(root: &Path) -> Result<Self> {
        if Self::is_initialized(root) {
            tracing::info!("Repository already initialized at {:?}", root);
            return Self::open(root);
        }

        let dir = root.join(REPO_DIR);
        fs::create_dir_all(&dir)?;
        DiskStore::init(&dir.join(OBJECTS_DIR))?;
        StagingArea::init(&dir.join(STAGING_DIR))?;

        let config = RepoConfig::load(&dir)?;
        if !RepoConfig::exists(&dir) {
            config.save(&dir)?;
        }

        let repo = Self::layout(root, config);
        let graph = repo.graph();
        let root_commit = graph.load(&graph.create_root()?)?;
        repo.log.init(&root_commit)?;
        repo.save_state(&RepoState::new(root_commit.id()))?;

        tracing::info!("Initialized repository at {:?} (root {})", dir, root_commit.id());
        Ok(repo)
    }

    /// Open an existing repository
    pub fn open(root: &Path) -> Result<Self> {
        if !Self::is_initialized(root) {
            return Err(RepoError::NotInitialized(root.to_path_buf()));
        }
        let config = RepoConfig::load(&root.join(REPO_DIR))?;
        let repo = Self::layout(root, config);

        if !repo.log.exists() {
            let state = repo.load_state()?;
            repo.log.rebuild(&repo.graph(), state.head)?;
        }
        Ok(repo)
    }

    /// Path to the `.mygit` directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self) -> &DiskStore {
        &self.store
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn graph(&self) -> CommitGraph<'_> {
        CommitGraph::new(&self.store).with_policy(LookupPolicy::from(&self.config))
    }

    pub fn load_state(&self) -> Result<RepoState> {
        RepoState::load(&self.dir.join(STATE_FILE))
    }

    pub fn save_state(&self, state: &RepoState) -> Result<()> {
        state.save(&self.dir.join(STATE_FILE))
    }

    /// The current head commit
    pub fn head(&self, state: &RepoState) -> Result<Commit> {
        self.graph().load(&state.head)
    }

    /// Stage one file.
    pub fn add(&self, state: &mut RepoState, name: &str) -> Result<AddOutcome> {
        let head = self.head(state)?;
        self.add_against(state, &head, name)
    }

    fn add_against(&self, state: &mut RepoState, head: &Commit, name: &str) -> Result<AddOutcome> {
        if self.work.contains(name) {
            state.cancel_removal(name);
            let current = self.work.digest(name)?;
            if head.files().contains_exact(name, &current) {
                self.staging.unstage(name)?;
                return Ok(AddOutcome::Unchanged);
            }
            self.staging.stage(name, &self.work.path(name))?;
            return Ok(AddOutcome::Staged);
        }

        if head.files().contains_name(name) {
            self.staging.unstage(name)?;
            state.mark_removed(name);
            return Ok(AddOutcome::MarkedRemoved);
        }
        Err(RepoError::FileNotFound(name.to_string()))
    }

    /// Stage every working file, and mark tracked files missing from the
    /// working directory for removal. Returns what happened to each name.
    pub fn add_all(&self, state: &mut RepoState) -> Result<Vec<(String, AddOutcome)>> {
        let head = self.head(state)?;
        let files = self.work.files()?;

        let mut outcomes = Vec::new();
        for name in &files {
            let outcome = self.add_against(state, &head, name)?;
            outcomes.push((name.clone(), outcome));
        }
        for name in head.files().names() {
            if files.binary_search_by(|f| f.as_str().cmp(name)).is_err() && state.mark_removed(name) {
                outcomes.push((name.to_string(), AddOutcome::MarkedRemoved));
            }
        }
        Ok(outcomes)
    }

    /// Unstage a file, and if it is tracked, mark it for removal and delete
    /// the working copy.
    pub fn remove(&self, state: &mut RepoState, name: &str) -> Result<()> {
        let was_staged = self.staging.unstage(name)?;
        let head = self.head(state)?;
        if head.files().contains_name(name) {
            state.mark_removed(name);
            self.work.remove(name)?;
            return Ok(());
        }
        if was_staged {
            Ok(())
        } else {
            Err(RepoError::NothingToRemove(name.to_string()))
        }
    }

    /// Turn staged copies and pending removals into a new head commit.
    pub fn commit(&self, state: &mut RepoState, message: &str) -> Result<Commit> {
        if self.staging.is_empty()? && state.removals.is_empty() {
            return Err(RepoError::EmptyCommit);
        }
        if message.trim().is_empty() {
            return Err(RepoError::EmptyMessage);
        }

        let parent = self.head(state)?;
        let delta = FileSetDelta {
            additions: self.staging.drain_into(&self.store)?,
            removals: state.removals.iter().cloned().collect(),
        };
        let commit = self.graph().append(&parent.id(), message, &delta)?;

        self.staging.clear()?;
        state.removals.clear();
        state.head = commit.id();
        self.log.record(&commit)?;

        tracing::info!(
            "Committed {} ({} added, {} removed)",
            commit.id(),
            delta.additions.len(),
            delta.removals.len()
        );
        Ok(commit)
    }

    /// Commits from the head back to the root
    pub fn history(&self, state: &RepoState) -> History<'_> {
        self.graph().history(state.head)
    }

    /// Addresses of every reachable commit with exactly this message
    pub fn find(&self, state: &RepoState, message: &str) -> Result<Vec<ObjectId>> {
        self.graph().find_by_message(state.head, message)
    }

    /// Look up a commit by full or abbreviated id
    pub fn resolve(&self, id: &str) -> Result<Commit> {
        self.graph().resolve(id)
    }

    pub fn status(&self, state: &RepoState) -> Result<Status> {
        let head = self.head(state)?;
        let staged = self.staging.snapshot()?;
        let working = self.work.snapshot()?;
        Ok(Status::compute(head.files(), &staged, &working, &state.removals))
    }

    /// Compare two commits given by full or abbreviated id
    pub fn diff(&self, from: &str, to: &str) -> Result<CommitDiff> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;

        let mut files = Vec::new();
        for change in diff_file_sets(from.files(), to.files()) {
            let lines = match &change {
                FileChange::Modified { old, new, .. } => {
                    let old = self.store.get(old)?;
                    let new = self.store.get(new)?;
                    line_diff(&String::from_utf8_lossy(&old), &String::from_utf8_lossy(&new))
                }
                _ => Vec::new(),
            };
            files.push(FileDiff { change, lines });
        }

        Ok(CommitDiff {
            from: from.id(),
            to: to.id(),
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{UnstagedChange, UnstagedKind};
    use crate::storage::StorageError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository, RepoState) {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let state = repo.load_state().unwrap();
        (tmp, repo, state)
    }

    fn write(tmp: &TempDir, name: &str, content: &str) {
        fs::write(tmp.path().join(name), content).unwrap();
    }

    #[test]
    fn test_init_creates_layout() {
        let (tmp, repo, state) = setup();
        let dir = tmp.path().join(".mygit");
        assert!(dir.join("objects/00").is_dir());
        assert!(dir.join("objects/ff").is_dir());
        assert!(dir.join("staging").is_dir());
        assert!(dir.join("config.json").is_file());
        assert!(repo.history_log().exists());

        let head = repo.head(&state).unwrap();
        assert!(head.is_root());
        assert_eq!(head.message(), "initial commit");
        assert!(state.removals.is_empty());
    }

    #[test]
    fn test_init_is_idempotent() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        let first = repo.commit(&mut state, "first").unwrap();
        repo.save_state(&state).unwrap();

        let again = Repository::init(tmp.path()).unwrap();
        assert_eq!(again.load_state().unwrap().head, first.id());
    }

    #[test]
    fn test_open_uninitialized() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(tmp.path()),
            Err(RepoError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_open_rebuilds_missing_log() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();
        repo.save_state(&state).unwrap();
        let expected = repo.history_log().read().unwrap();

        fs::remove_file(tmp.path().join(".mygit/log")).unwrap();
        let reopened = Repository::open(tmp.path()).unwrap();
        assert_eq!(reopened.history_log().read().unwrap(), expected);
    }

    #[test]
    fn test_add_missing_untracked_file() {
        let (_tmp, repo, mut state) = setup();
        assert!(matches!(
            repo.add(&mut state, "nope.txt"),
            Err(RepoError::FileNotFound(_))
        ));
        assert!(matches!(
            repo.add(&mut state, ".mygit"),
            Err(RepoError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_readd_unchanged_file_is_noop() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();
        let objects_before = repo.store().bucket_entries("aa").unwrap();

        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::Unchanged);
        assert!(repo.status(&state).unwrap().staged.is_empty());
        assert_eq!(repo.store().bucket_entries("aa").unwrap(), objects_before);
        assert!(matches!(
            repo.commit(&mut state, "nothing"),
            Err(RepoError::EmptyCommit)
        ));
    }

    #[test]
    fn test_revert_to_committed_content_drops_staged_copy() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();

        write(&tmp, "a.txt", "changed");
        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::Staged);
        write(&tmp, "a.txt", "hello");
        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::Unchanged);
        assert!(repo.status(&state).unwrap().is_clean());
    }

    #[test]
    fn test_add_cancels_pending_removal() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();

        repo.remove(&mut state, "a.txt").unwrap();
        assert!(state.is_removed("a.txt"));

        write(&tmp, "a.txt", "hello");
        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::Unchanged);
        assert!(!state.is_removed("a.txt"));
    }

    #[test]
    fn test_add_missing_tracked_file_marks_removal() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();

        fs::remove_file(tmp.path().join("a.txt")).unwrap();
        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::MarkedRemoved);
        assert_eq!(repo.add(&mut state, "a.txt").unwrap(), AddOutcome::MarkedRemoved);
        assert!(state.is_removed("a.txt"));
    }

    #[test]
    fn test_add_all() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "a");
        write(&tmp, "b.txt", "b");
        repo.add_all(&mut state).unwrap();
        repo.commit(&mut state, "both").unwrap();

        fs::remove_file(tmp.path().join("a.txt")).unwrap();
        write(&tmp, "b.txt", "b2");
        write(&tmp, "c.txt", "c");
        let outcomes = repo.add_all(&mut state).unwrap();
        assert_eq!(
            outcomes,
            vec![
                ("b.txt".to_string(), AddOutcome::Staged),
                ("c.txt".to_string(), AddOutcome::Staged),
                ("a.txt".to_string(), AddOutcome::MarkedRemoved),
            ]
        );

        // Already marked: not reported twice
        let again = repo.add_all(&mut state).unwrap();
        assert_eq!(again.len(), 2);

        let commit = repo.commit(&mut state, "update").unwrap();
        let names: Vec<&str> = commit.files().names().collect();
        assert_eq!(names, vec!["b.txt", "c.txt"]);
    }

    #[test]
    fn test_remove_staged_only() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();

        repo.remove(&mut state, "a.txt").unwrap();
        assert!(tmp.path().join("a.txt").exists());
        assert!(!state.is_removed("a.txt"));
        assert!(repo.status(&state).unwrap().staged.is_empty());

        assert!(matches!(
            repo.remove(&mut state, "a.txt"),
            Err(RepoError::NothingToRemove(_))
        ));
    }

    #[test]
    fn test_commit_requires_message() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        assert!(matches!(
            repo.commit(&mut state, "   "),
            Err(RepoError::EmptyMessage)
        ));
        // Nothing was consumed
        assert_eq!(repo.status(&state).unwrap().staged, vec!["a.txt"]);
    }

    #[test]
    fn test_empty_commit_reported_before_missing_message() {
        let (_tmp, repo, mut state) = setup();
        let head = state.head;
        assert!(matches!(
            repo.commit(&mut state, ""),
            Err(RepoError::EmptyCommit)
        ));
        assert_eq!(state.head, head);
    }

    #[test]
    fn test_commit_keeps_staging_when_head_is_missing() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();

        state.head = ObjectId::from_data(b"no such commit");
        assert!(matches!(
            repo.commit(&mut state, "first"),
            Err(RepoError::Storage(StorageError::NotFound(_)))
        ));
        assert_eq!(repo.staging.names().unwrap(), vec!["a.txt"]);
        assert!(!repo.store.contains(&ObjectId::from_data(b"hello")).unwrap());
    }

    #[test]
    fn test_status_reports_deleted_tracked_file() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "a.txt", "hello");
        repo.add(&mut state, "a.txt").unwrap();
        repo.commit(&mut state, "first").unwrap();

        fs::remove_file(tmp.path().join("a.txt")).unwrap();
        assert_eq!(
            repo.status(&state).unwrap().unstaged,
            vec![UnstagedChange {
                name: "a.txt".to_string(),
                kind: UnstagedKind::Deleted,
            }]
        );
    }

    #[test]
    fn test_diff_commits() {
        let (tmp, repo, mut state) = setup();
        write(&tmp, "x", "one\ntwo\n");
        repo.add(&mut state, "x").unwrap();
        let a = repo.commit(&mut state, "a").unwrap();

        write(&tmp, "x", "one\ntwo\nthree\n");
        write(&tmp, "y", "why");
        repo.add_all(&mut state).unwrap();
        let b = repo.commit(&mut state, "b").unwrap();

        let diff = repo.diff(&a.id().to_hex()[..6], &b.id().to_hex()).unwrap();
        assert_eq!(diff.files.len(), 2);
        assert_eq!(diff.files[0].change.name(), "x");
        assert_eq!(
            diff.files[0].lines,
            vec![crate::diff::LineChange::Added("three".to_string())]
        );
        assert!(matches!(diff.files[1].change, FileChange::Added(_)));
        assert!(diff.files[1].lines.is_empty());

        assert!(repo.diff(&b.id().to_hex(), &b.id().to_hex()).unwrap().is_empty());
    }
}
