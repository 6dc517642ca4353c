//! Per-file three-way merge used by the import resolver.
//!
//! Inputs are the base tree (common ancestor), the local working copy
//! contents ("ours"), and the incoming tree ("theirs"). Resolution per file:
//!
//! - both sides identical → keep as-is
//! - only theirs changed from base → take theirs
//! - only ours changed from base → keep ours
//! - both changed with different content → conflict, rendered with
//!   conflict markers so the working copy stays editable
//!
//! Deletions count as changes: a file deleted on one side and untouched on
//! the other is deleted; deleted on one side and modified on the other is a
//! conflict.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use weft_store::{Blob, FileTree, ObjectStore};

use crate::error::{DiffError, DiffResult};

/// How a single file resolved during a three-way merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergedFile {
    /// Local content kept (theirs did not change it, or both sides match).
    Ours(Vec<u8>),
    /// Incoming content taken (we did not change it from base).
    Theirs(Vec<u8>),
    /// Both sides changed it differently; content carries conflict markers.
    Conflict(Vec<u8>),
}

impl MergedFile {
    /// The bytes to write into the working copy.
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Ours(c) | Self::Theirs(c) | Self::Conflict(c) => c,
        }
    }

    /// Returns `true` if this file needs manual resolution.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// The result of merging one component's trees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeMerge {
    /// Resolved file contents by path. Files deleted by the merge are
    /// absent from the map.
    pub files: BTreeMap<String, MergedFile>,
}

impl TreeMerge {
    /// Paths that could not be auto-resolved, sorted.
    pub fn conflicts(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|(_, f)| f.is_conflict())
            .map(|(p, _)| p.as_str())
            .collect()
    }

    /// Returns `true` if every file auto-resolved.
    pub fn is_clean(&self) -> bool {
        self.files.values().all(|f| !f.is_conflict())
    }
}

/// Three-way merge of a component's file trees.
///
/// `base` is the common ancestor tree (`None` when the histories share no
/// ancestor), `ours` the local working copy contents, `theirs` the incoming
/// tree. Base and incoming blobs are read from `store`.
pub fn merge_trees(
    store: &dyn ObjectStore,
    base: Option<&FileTree>,
    ours: &BTreeMap<String, Vec<u8>>,
    theirs: &FileTree,
) -> DiffResult<TreeMerge> {
    let mut paths: BTreeSet<&str> = BTreeSet::new();
    if let Some(base) = base {
        paths.extend(base.files.keys().map(String::as_str));
    }
    paths.extend(ours.keys().map(String::as_str));
    paths.extend(theirs.files.keys().map(String::as_str));

    let mut files = BTreeMap::new();
    for path in paths {
        let base_content = match base.and_then(|b| b.get(path)) {
            Some(hash) => Some(read_blob(store, hash)?),
            None => None,
        };
        let our_content = ours.get(path).cloned();
        let their_content = match theirs.get(path) {
            Some(hash) => Some(read_blob(store, hash)?),
            None => None,
        };

        // `None` means the file was deleted on the winning side.
        if let Some(merged) = resolve(base_content, our_content, their_content) {
            if merged.is_conflict() {
                debug!(path, "merge conflict");
            }
            files.insert(path.to_string(), merged);
        }
    }
    Ok(TreeMerge { files })
}

fn read_blob(store: &dyn ObjectStore, hash: &weft_types::ObjectHash) -> DiffResult<Vec<u8>> {
    let stored = store.read(hash)?.ok_or(DiffError::ObjectNotFound(*hash))?;
    Ok(Blob::from_stored_object(&stored)?.data)
}

fn resolve(
    base: Option<Vec<u8>>,
    ours: Option<Vec<u8>>,
    theirs: Option<Vec<u8>>,
) -> Option<MergedFile> {
    if ours == theirs {
        return ours.map(MergedFile::Ours);
    }
    if ours == base {
        return theirs.map(MergedFile::Theirs);
    }
    if theirs == base {
        return ours.map(MergedFile::Ours);
    }
    Some(MergedFile::Conflict(render_conflict(
        ours.as_deref(),
        theirs.as_deref(),
    )))
}

fn render_conflict(ours: Option<&[u8]>, theirs: Option<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"<<<<<<< ours\n");
    if let Some(ours) = ours {
        out.extend_from_slice(ours);
        if !ours.ends_with(b"\n") {
            out.push(b'\n');
        }
    }
    out.extend_from_slice(b"=======\n");
    if let Some(theirs) = theirs {
        out.extend_from_slice(theirs);
        if !theirs.ends_with(b"\n") {
            out.push(b'\n');
        }
    }
    out.extend_from_slice(b">>>>>>> theirs\n");
    out
}
