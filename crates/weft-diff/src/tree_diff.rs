//! Tree-level diff: compare two file tree snapshots by path.
//!
//! A [`FileTree`] is a flat map from relative path to blob hash, so the diff
//! is a straight map comparison: paths only in the new tree are additions,
//! paths only in the old tree are removals, paths in both with different
//! blob hashes are modifications.

use weft_store::FileTree;
use weft_types::ObjectHash;

/// The result of comparing two file trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// The list of changes between the old and new trees.
    pub changes: Vec<TreeChange>,
}

impl TreeDiff {
    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Paths touched by this diff, in change order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(TreeChange::path)
    }
}

/// A single change between two trees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeChange {
    /// A file present only in the new tree.
    Added { path: String, blob: ObjectHash },
    /// A file present only in the old tree.
    Removed { path: String, blob: ObjectHash },
    /// A file present in both trees with different content.
    Modified {
        path: String,
        old_blob: ObjectHash,
        new_blob: ObjectHash,
    },
}

impl TreeChange {
    /// The path this change touches.
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }
}

/// Compare two trees and produce a diff.
///
/// Pass `None` for `old` to diff against an empty tree (everything in `new`
/// reports as added). Entries are visited in path order, so the change list
/// is deterministic.
pub fn diff_trees(old: Option<&FileTree>, new: &FileTree) -> TreeDiff {
    static EMPTY: FileTree = FileTree {
        files: std::collections::BTreeMap::new(),
    };
    let old = old.unwrap_or(&EMPTY);

    let mut changes = Vec::new();
    for (path, old_blob) in &old.files {
        match new.files.get(path) {
            Some(new_blob) if new_blob != old_blob => changes.push(TreeChange::Modified {
                path: path.clone(),
                old_blob: *old_blob,
                new_blob: *new_blob,
            }),
            Some(_) => {}
            None => changes.push(TreeChange::Removed {
                path: path.clone(),
                blob: *old_blob,
            }),
        }
    }
    for (path, new_blob) in &new.files {
        if !old.files.contains_key(path) {
            changes.push(TreeChange::Added {
                path: path.clone(),
                blob: *new_blob,
            });
        }
    }
    TreeDiff { changes }
}
