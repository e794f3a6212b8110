//! Human-readable output for log, find, status and diff.

use mygit_core::{format_entry, Commit, CommitDiff, FileChange, LineChange, ObjectId, Status};
use std::io::{self, Write};

/// Print one history entry followed by a blank line.
pub fn write_log_entry(writer: &mut dyn Write, commit: &Commit) -> io::Result<()> {
    writeln!(writer, "{}", format_entry(commit))
}

pub fn write_find(writer: &mut dyn Write, found: &[ObjectId]) -> io::Result<()> {
    if found.is_empty() {
        writeln!(writer, "Found no commit with that message.")?;
        return Ok(());
    }
    for id in found {
        writeln!(writer, "{}", id)?;
    }
    Ok(())
}

pub fn write_status(writer: &mut dyn Write, status: &Status) -> io::Result<()> {
    writeln!(writer, "=== Staged Files ===")?;
    for name in &status.staged {
        writeln!(writer, "{}", name)?;
    }

    writeln!(writer)?;
    writeln!(writer, "=== Removed Files ===")?;
    for name in &status.removed {
        writeln!(writer, "{}", name)?;
    }

    writeln!(writer)?;
    writeln!(writer, "=== Modifications Not Staged For Commit ===")?;
    for change in &status.unstaged {
        writeln!(writer, "{} ({})", change.name, change.kind)?;
    }

    writeln!(writer)?;
    writeln!(writer, "=== Untracked Files ===")?;
    for name in &status.untracked {
        writeln!(writer, "{}", name)?;
    }
    writeln!(writer)?;
    Ok(())
}

pub fn write_diff(writer: &mut dyn Write, diff: &CommitDiff) -> io::Result<()> {
    for file in &diff.files {
        match &file.change {
            FileChange::Added(entry) => writeln!(writer, "+ {}", entry.name)?,
            FileChange::Removed(entry) => writeln!(writer, "- {}", entry.name)?,
            FileChange::Modified { name, .. } => writeln!(writer, "modified: {}", name)?,
        }
        for line in &file.lines {
            match line {
                LineChange::Removed(text) => writeln!(writer, "- {}", text)?,
                LineChange::Added(text) => writeln!(writer, "+ {}", text)?,
            }
        }
    }
    Ok(())
}
