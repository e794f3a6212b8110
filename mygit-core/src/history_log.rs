//! Human-readable history log at `.mygit/log`, newest entry first.
//!
//! The commit graph is authoritative; this file mirrors it and is rebuilt
//! from the graph when missing.

use crate::error::Result;
use crate::graph::CommitGraph;
use crate::object::{Commit, ObjectId};
use std::fs;
use std::path::{Path, PathBuf};

/// Format one commit the way `log` prints it
pub fn format_entry(commit: &Commit) -> String {
    format!(
        "===\ncommit {}\nDate: {}\n{}\n",
        commit.id(),
        commit.time(),
        commit.message()
    )
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Start a new log holding only `root`
    pub fn init(&self, root: &Commit) -> Result<()> {
        self.write(&format_entry(root))
    }

    /// Prepend the entry for a new head commit
    pub fn record(&self, commit: &Commit) -> Result<()> {
        let existing = if self.exists() {
            self.read()?
        } else {
            String::new()
        };
        self.write(&format!("{}\n{}", format_entry(commit), existing))
    }

    /// Regenerate the log by walking history from `head`
    pub fn rebuild(&self, graph: &CommitGraph<'_>, head: ObjectId) -> Result<()> {
        let entries = graph
            .history(head)
            .map(|commit| commit.map(|c| format_entry(&c)))
            .collect::<Result<Vec<_>>>()?;
        self.write(&entries.join("\n"))?;
        tracing::warn!("Rebuilt history log from {} commits", entries.len());
        Ok(())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
