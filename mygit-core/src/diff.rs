//! Commit comparison: file-set diff and line diff
//!
//! The line diff is a synchronized two-pointer scan, not a minimal edit
//! script. After an inserted or deleted line the two sides stay out of step,
//! so every following line is reported as changed. Output compatibility
//! depends on keeping it that way.

use crate::object::{FileEntry, FileSet, ObjectId};
use std::collections::BTreeSet;

/// How a single name differs between two file sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// Present only in the second set
    Added(FileEntry),
    /// Present only in the first set
    Removed(FileEntry),
    /// Present in both under different digests
    Modified {
        name: String,
        old: ObjectId,
        new: ObjectId,
    },
}

impl FileChange {
    pub fn name(&self) -> &str {
        match self {
            FileChange::Added(entry) | FileChange::Removed(entry) => &entry.name,
            FileChange::Modified { name, .. } => name,
        }
    }
}

/// Symmetric difference of two file sets, in name order.
/// Names with the same digest on both sides are omitted.
pub fn diff_file_sets(from: &FileSet, to: &FileSet) -> Vec<FileChange> {
    let names: BTreeSet<&str> = from.names().chain(to.names()).collect();
    names
        .into_iter()
        .filter_map(|name| match (from.get(name), to.get(name)) {
            (None, Some(id)) => Some(FileChange::Added(FileEntry::new(id, name))),
            (Some(id), None) => Some(FileChange::Removed(FileEntry::new(id, name))),
            (Some(old), Some(new)) if old != new => Some(FileChange::Modified {
                name: name.to_string(),
                old,
                new,
            }),
            _ => None,
        })
        .collect()
}

/// One line reported by [`line_diff`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineChange {
    Removed(String),
    Added(String),
}

/// Split text on any line break sequence.
///
/// Breaks are `\r\n`, `\n`, `\r`, vertical tab, form feed, NEL, and the
/// Unicode line and paragraph separators. Trailing empty lines are dropped;
/// text without any break is a single line (even when empty).
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let width = match c {
            '\r' => {
                if matches!(chars.peek(), Some((_, '\n'))) {
                    chars.next();
                    2
                } else {
                    1
                }
            }
            '\n' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}' => c.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..i]);
        start = i + width;
    }

    if lines.is_empty() {
        return vec![text];
    }
    lines.push(&text[start..]);
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Line-level changes from `old` to `new`.
///
/// At each step: if the current old line differs from the current new line
/// (or the new side is exhausted) the old line is removed; otherwise if they
/// differ (or the old side is exhausted) the new line is added; equal lines
/// advance both sides silently.
pub fn line_diff(old: &str, new: &str) -> Vec<LineChange> {
    let old = split_lines(old);
    let new = split_lines(new);
    let (mut i, mut j) = (0, 0);
    let mut changes = Vec::new();

    while i < old.len() || j < new.len() {
        if i < old.len() && (j >= new.len() || old[i] != new[j]) {
            changes.push(LineChange::Removed(old[i].to_string()));
            i += 1;
        } else if j < new.len() && (i >= old.len() || old[i] != new[j]) {
            changes.push(LineChange::Added(new[j].to_string()));
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }
    changes
}

/// One file's entry in a commit diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub change: FileChange,
    /// Line changes; only filled for modified files
    pub lines: Vec<LineChange>,
}

/// Everything that differs between two commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDiff {
    pub from: ObjectId,
    pub to: ObjectId,
    pub files: Vec<FileDiff>,
}

impl CommitDiff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn removed(line: &str) -> LineChange {
        LineChange::Removed(line.to_string())
    }

    fn added(line: &str) -> LineChange {
        LineChange::Added(line.to_string())
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\na"), vec!["", "a"]);
        assert_eq!(split_lines("a\u{2028}b"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\n\n"), vec!["a"]);
        assert_eq!(split_lines(""), vec![""]);
        assert!(split_lines("\n").is_empty());
    }

    #[test]
    fn test_line_diff_identical() {
        assert!(line_diff("a\nb\nc\n", "a\nb\nc\n").is_empty());
    }

    #[test]
    fn test_line_diff_appended_line() {
        assert_eq!(line_diff("a\nb\n", "a\nb\nc\n"), vec![added("c")]);
        assert_eq!(line_diff("a\nb\nc\n", "a\nb\n"), vec![removed("c")]);
    }

    #[test]
    fn test_line_diff_changed_line() {
        assert_eq!(line_diff("a\nb", "a\nx"), vec![removed("b"), added("x")]);
        // The scan keeps removing until the old side runs out
        assert_eq!(
            line_diff("a\nb\nc", "a\nx\nc"),
            vec![removed("b"), removed("c"), added("x"), added("c")]
        );
    }

    #[test]
    fn test_line_diff_does_not_realign() {
        // One inserted line shifts every later comparison
        assert_eq!(
            line_diff("a\nb\nc", "x\na\nb\nc"),
            vec![
                removed("a"),
                removed("b"),
                removed("c"),
                added("x"),
                added("a"),
                added("b"),
                added("c"),
            ]
        );
    }

    #[test]
    fn test_diff_file_sets() {
        let d1 = ObjectId::from_data(b"1");
        let d2 = ObjectId::from_data(b"2");
        let d3 = ObjectId::from_data(b"3");
        let a: FileSet = [FileEntry::new(d1, "x"), FileEntry::new(d1, "z")].into_iter().collect();
        let b: FileSet = [FileEntry::new(d2, "x"), FileEntry::new(d3, "y")].into_iter().collect();

        assert_eq!(
            diff_file_sets(&a, &b),
            vec![
                FileChange::Modified {
                    name: "x".to_string(),
                    old: d1,
                    new: d2,
                },
                FileChange::Added(FileEntry::new(d3, "y")),
                FileChange::Removed(FileEntry::new(d1, "z")),
            ]
        );
        assert!(diff_file_sets(&a, &a).is_empty());
    }

    proptest! {
        #[test]
        fn prop_line_diff_of_self_is_empty(lines in proptest::collection::vec("[a-z ]{0,8}", 0..20)) {
            let text = lines.join("\n");
            prop_assert!(line_diff(&text, &text).is_empty());
        }
    }
}
