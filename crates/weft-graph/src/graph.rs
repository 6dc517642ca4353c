use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;
use weft_store::{ObjectStore, VersionObject};
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::{GraphError, GraphResult};
use crate::traits::LaneStore;

/// A component version graph bound to an object store and a lane head table.
///
/// The graph itself is derived data: version objects in the store reference
/// their parents by hash, and lane heads name the tips. `VersionGraph` only
/// coordinates the two — persisting the object before advancing the head so
/// readers never observe a head whose backing bytes are absent.
#[derive(Clone)]
pub struct VersionGraph {
    store: Arc<dyn ObjectStore>,
    lanes: Arc<dyn LaneStore>,
}

impl VersionGraph {
    /// Bind a graph to its backing stores.
    pub fn new(store: Arc<dyn ObjectStore>, lanes: Arc<dyn LaneStore>) -> Self {
        Self { store, lanes }
    }

    /// The backing object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The backing lane head table.
    pub fn lanes(&self) -> &Arc<dyn LaneStore> {
        &self.lanes
    }

    /// Current head of `component`'s `lane`.
    pub fn head_of(&self, component: &ComponentId, lane: &Lane) -> GraphResult<Option<ObjectHash>> {
        self.lanes.head(component, lane)
    }

    /// Load a version object by hash.
    pub fn load_version(&self, hash: &ObjectHash) -> GraphResult<VersionObject> {
        let stored = self
            .store
            .read(hash)?
            .ok_or(GraphError::VersionNotFound(*hash))?;
        Ok(VersionObject::from_stored_object(&stored)?)
    }

    /// Append a version to `component`'s `lane` and advance the head.
    ///
    /// Validates that every declared parent exists in the store, persists
    /// the new object, then compare-and-swaps the lane head. Advancement is
    /// rejected with [`GraphError::NonLinearUpdate`] when the current head
    /// is not among the declared parents — appending must never silently
    /// discard concurrent work. On any failure the head is left unchanged.
    pub fn append(
        &self,
        component: &ComponentId,
        lane: &Lane,
        version: &VersionObject,
    ) -> GraphResult<ObjectHash> {
        let head = self.lanes.head(component, lane)?;
        if let Some(current) = head {
            if !version.parents.contains(&current) {
                return Err(GraphError::NonLinearUpdate {
                    component: component.without_version(),
                    lane: lane.clone(),
                    expected: version.parents.first().copied(),
                    actual: head,
                });
            }
        }
        for parent in &version.parents {
            if !self.store.exists(parent)? {
                return Err(GraphError::MissingParent {
                    component: component.without_version(),
                    parent: *parent,
                });
            }
        }
        // Write-before-head-advance: the object must be durable before any
        // reader can reach it through the head.
        let hash = self.store.write(&version.to_stored_object()?)?;
        self.lanes.compare_and_swap(component, lane, head, hash)?;
        debug!(
            component = %component.full_name(),
            lane = %lane,
            version = %hash.short_hex(),
            parents = version.parents.len(),
            "appended version"
        );
        Ok(hash)
    }

    /// Lazy, newest-first walk over `component`'s `lane` history.
    ///
    /// Each call re-reads the current head, so the walk is restartable and
    /// always reflects the latest append. Every reachable version is visited
    /// exactly once; the walk terminates at parentless roots.
    pub fn history(&self, component: &ComponentId, lane: &Lane) -> GraphResult<History<'_>> {
        let head = self.lanes.head(component, lane)?;
        Ok(History::new(self, head))
    }

    /// Walk from `hash`, visiting every reachable version exactly once.
    pub fn walk_from(&self, hash: ObjectHash) -> History<'_> {
        History::new(self, Some(hash))
    }

    /// Returns `true` if `ancestor` is reachable from `descendant` via
    /// parent pointers (a version is considered its own ancestor).
    pub fn is_ancestor(&self, ancestor: &ObjectHash, descendant: &ObjectHash) -> GraphResult<bool> {
        for item in self.walk_from(*descendant) {
            let (hash, _) = item?;
            if hash == *ancestor {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Closest common ancestor of two versions, if any.
    ///
    /// Walks breadth-first from `b` and returns the first version that is
    /// also reachable from `a`.
    pub fn merge_base(&self, a: &ObjectHash, b: &ObjectHash) -> GraphResult<Option<ObjectHash>> {
        let mut reachable_from_a = HashSet::new();
        for item in self.walk_from(*a) {
            let (hash, _) = item?;
            reachable_from_a.insert(hash);
        }
        for item in self.walk_from(*b) {
            let (hash, _) = item?;
            if reachable_from_a.contains(&hash) {
                return Ok(Some(hash));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for VersionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionGraph").finish_non_exhaustive()
    }
}

/// Iterator over a version graph, newest-first.
///
/// Breadth-first over parent pointers with a visited set, so merge
/// histories yield each version exactly once.
pub struct History<'a> {
    graph: &'a VersionGraph,
    queue: VecDeque<ObjectHash>,
    visited: HashSet<ObjectHash>,
}

impl<'a> History<'a> {
    fn new(graph: &'a VersionGraph, head: Option<ObjectHash>) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        if let Some(head) = head {
            queue.push_back(head);
            visited.insert(head);
        }
        Self {
            graph,
            queue,
            visited,
        }
    }
}

impl Iterator for History<'_> {
    type Item = GraphResult<(ObjectHash, VersionObject)>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.queue.pop_front()?;
        let version = match self.graph.load_version(&hash) {
            Ok(version) => version,
            Err(e) => return Some(Err(e)),
        };
        for parent in &version.parents {
            if self.visited.insert(*parent) {
                self.queue.push_back(*parent);
            }
        }
        Some(Ok((hash, version)))
    }
}
