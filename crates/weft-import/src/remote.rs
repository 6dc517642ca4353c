//! The remote scope seam.
//!
//! An importer only needs three things from a remote: its head table, its
//! objects, and its component listing. Transport (HTTP, ssh, a directory on
//! a shared drive) lives behind this trait.

use std::sync::Arc;

use weft_graph::{InMemoryLaneStore, VersionGraph};
use weft_store::{InMemoryObjectStore, ObjectStore, StoredObject};
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::ImportResult;

/// Read access to a remote scope's published components.
pub trait RemoteScope: Send + Sync {
    /// The scope's name, used in reports and errors.
    fn name(&self) -> &str;

    /// Current head of `component`'s `lane` on the remote, if published.
    fn head_of(&self, component: &ComponentId, lane: &Lane) -> ImportResult<Option<ObjectHash>>;

    /// Fetch one object by hash.
    fn fetch(&self, hash: &ObjectHash) -> ImportResult<Option<StoredObject>>;

    /// All components the remote publishes, version-less, sorted.
    fn list(&self) -> ImportResult<Vec<ComponentId>>;
}

/// A remote scope held entirely in memory, for tests and for local
/// scope-to-scope wiring.
pub struct InMemoryRemoteScope {
    name: String,
    graph: VersionGraph,
}

impl InMemoryRemoteScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: VersionGraph::new(
                Arc::new(InMemoryObjectStore::new()),
                Arc::new(InMemoryLaneStore::new()),
            ),
        }
    }

    /// The remote's own version graph, for publishing content into it.
    pub fn graph(&self) -> &VersionGraph {
        &self.graph
    }
}

impl RemoteScope for InMemoryRemoteScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn head_of(&self, component: &ComponentId, lane: &Lane) -> ImportResult<Option<ObjectHash>> {
        Ok(self.graph.head_of(component, lane)?)
    }

    fn fetch(&self, hash: &ObjectHash) -> ImportResult<Option<StoredObject>> {
        Ok(self.graph.store().read(hash)?)
    }

    fn list(&self) -> ImportResult<Vec<ComponentId>> {
        Ok(self.graph.lanes().components()?)
    }
}

impl std::fmt::Debug for InMemoryRemoteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemoteScope")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A remote scope backed by another weft metadata directory on disk, e.g. a
/// workspace's `.weft/` on a shared drive.
pub struct FsRemoteScope {
    name: String,
    graph: VersionGraph,
}

impl FsRemoteScope {
    /// Open the metadata directory at `dir` (expects `objects/` and
    /// `heads.json` inside it).
    pub fn open(name: impl Into<String>, dir: impl AsRef<std::path::Path>) -> ImportResult<Self> {
        let dir = dir.as_ref();
        let store = weft_store::FsObjectStore::open(dir.join("objects"))?;
        let lanes = weft_graph::FsLaneStore::open(dir.join("heads.json"))?;
        Ok(Self {
            name: name.into(),
            graph: VersionGraph::new(Arc::new(store), Arc::new(lanes)),
        })
    }
}

impl RemoteScope for FsRemoteScope {
    fn name(&self) -> &str {
        &self.name
    }

    fn head_of(&self, component: &ComponentId, lane: &Lane) -> ImportResult<Option<ObjectHash>> {
        Ok(self.graph.head_of(component, lane)?)
    }

    fn fetch(&self, hash: &ObjectHash) -> ImportResult<Option<StoredObject>> {
        Ok(self.graph.store().read(hash)?)
    }

    fn list(&self) -> ImportResult<Vec<ComponentId>> {
        Ok(self.graph.lanes().components()?)
    }
}

impl std::fmt::Debug for FsRemoteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsRemoteScope")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
