//! The mutable, in-workspace side of a component.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use weft_store::{Blob, DependencyPin, FileTree, StoreResult};
use weft_types::{ComponentId, ObjectHash};

/// A component's working copy plus its sync point.
///
/// `files` holds the current source contents; `base` is the version the
/// working copy was last synced from (`None` for a component that has never
/// been snapped). `merging` carries the pre-import local head while a
/// divergent import awaits its resolving snap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentState {
    /// The component's identity (version-less).
    pub id: ComponentId,
    /// Working copy contents by relative path.
    pub files: BTreeMap<String, Vec<u8>>,
    /// The version this working copy is based on.
    pub base: Option<ObjectHash>,
    /// Set while a merge is in progress: the local head that the next snap
    /// must record as its second parent.
    pub merging: Option<ObjectHash>,
    /// Current dependency resolution of the working copy.
    pub dependencies: Vec<DependencyPin>,
}

impl ComponentState {
    /// A fresh, never-snapped component with the given working copy.
    pub fn new(id: ComponentId, files: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            id: id.without_version(),
            files,
            base: None,
            merging: None,
            dependencies: Vec::new(),
        }
    }

    /// Load a working copy from a directory on disk.
    ///
    /// Paths are recorded relative to `dir` with `/` separators. Hidden
    /// directories (leading `.`) are skipped so workspace metadata never
    /// ends up inside a snapshot.
    pub fn from_dir(id: ComponentId, dir: &Path) -> io::Result<Self> {
        let mut files = BTreeMap::new();
        let walker = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));
        for entry in walker {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .map_err(io::Error::other)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(rel, fs::read(entry.path())?);
        }
        Ok(Self::new(id, files))
    }

    /// The file tree this working copy would snapshot to. Pure computation,
    /// nothing is written.
    pub fn tree(&self) -> StoreResult<FileTree> {
        Ok(FileTree::from_entries(
            self.files
                .iter()
                .map(|(path, content)| (path.clone(), Blob::hash_of(content))),
        ))
    }

    /// Replace one file's content in the working copy.
    pub fn set_file(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Record the working copy's resolved pin for `dependency`, replacing
    /// any previous pin for the same component.
    pub fn pin_dependency(&mut self, dependency: &ComponentId, version: ObjectHash) {
        self.dependencies
            .retain(|pin| !pin.component.same_component(dependency));
        self.dependencies
            .push(DependencyPin::new(dependency.clone(), version));
        self.dependencies.sort();
    }

    /// The current pin for `dependency`, if the working copy depends on it.
    pub fn pin_for(&self, dependency: &ComponentId) -> Option<&DependencyPin> {
        self.dependencies
            .iter()
            .find(|pin| pin.component.same_component(dependency))
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
