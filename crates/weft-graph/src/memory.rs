use std::collections::BTreeMap;
use std::sync::RwLock;

use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::{GraphError, GraphResult};
use crate::traits::LaneStore;

type HeadTable = BTreeMap<String, BTreeMap<String, ObjectHash>>;

/// In-memory lane head table.
///
/// Intended for tests and in-memory remote scopes. The compare-and-swap is
/// implemented under a single write lock, which is sufficient for the
/// single-process writer model.
pub struct InMemoryLaneStore {
    heads: RwLock<HeadTable>,
}

impl InMemoryLaneStore {
    /// Create an empty lane store.
    pub fn new() -> Self {
        Self {
            heads: RwLock::new(BTreeMap::new()),
        }
    }

    /// Total number of recorded `(component, lane)` heads.
    pub fn len(&self) -> usize {
        self.heads
            .read()
            .expect("lock poisoned")
            .values()
            .map(|lanes| lanes.len())
            .sum()
    }

    /// Returns `true` if no heads are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLaneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LaneStore for InMemoryLaneStore {
    fn head(&self, component: &ComponentId, lane: &Lane) -> GraphResult<Option<ObjectHash>> {
        let table = self.heads.read().expect("lock poisoned");
        Ok(table
            .get(&component.full_name())
            .and_then(|lanes| lanes.get(lane.name()))
            .copied())
    }

    fn compare_and_swap(
        &self,
        component: &ComponentId,
        lane: &Lane,
        expected: Option<ObjectHash>,
        new: ObjectHash,
    ) -> GraphResult<()> {
        let mut table = self.heads.write().expect("lock poisoned");
        let lanes = table.entry(component.full_name()).or_default();
        let actual = lanes.get(lane.name()).copied();
        if actual != expected {
            return Err(GraphError::NonLinearUpdate {
                component: component.without_version(),
                lane: lane.clone(),
                expected,
                actual,
            });
        }
        lanes.insert(lane.name().to_string(), new);
        Ok(())
    }

    fn lanes_of(&self, component: &ComponentId) -> GraphResult<Vec<Lane>> {
        let table = self.heads.read().expect("lock poisoned");
        let lanes = table
            .get(&component.full_name())
            .map(|lanes| {
                lanes
                    .keys()
                    .filter_map(|name| Lane::new(name.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(lanes)
    }

    fn components(&self) -> GraphResult<Vec<ComponentId>> {
        let table = self.heads.read().expect("lock poisoned");
        Ok(table.keys().filter_map(|name| name.parse().ok()).collect())
    }
}

impl std::fmt::Debug for InMemoryLaneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLaneStore")
            .field("head_count", &self.len())
            .finish()
    }
}
