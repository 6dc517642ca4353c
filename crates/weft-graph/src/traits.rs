use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::GraphResult;

/// Storage backend for per-component, per-lane head pointers.
///
/// This is the small reference table keyed by `(component, lane)`, analogous
/// to ref files in a distributed VCS. Implementations must be thread-safe
/// and provide an atomic compare-and-swap on head values — the only
/// synchronization primitive the engine needs for safe concurrent snaps.
pub trait LaneStore: Send + Sync {
    /// Current head of `component`'s `lane`, or `None` if the lane has no
    /// history yet.
    fn head(&self, component: &ComponentId, lane: &Lane) -> GraphResult<Option<ObjectHash>>;

    /// Atomically advance the head from `expected` to `new`.
    ///
    /// Fails with [`GraphError::NonLinearUpdate`] if the stored head no
    /// longer equals `expected`; the head is left untouched in that case.
    ///
    /// [`GraphError::NonLinearUpdate`]: crate::error::GraphError::NonLinearUpdate
    fn compare_and_swap(
        &self,
        component: &ComponentId,
        lane: &Lane,
        expected: Option<ObjectHash>,
        new: ObjectHash,
    ) -> GraphResult<()>;

    /// All lanes recorded for `component`, sorted by name.
    fn lanes_of(&self, component: &ComponentId) -> GraphResult<Vec<Lane>>;

    /// All components with at least one recorded head, as version-less ids,
    /// sorted.
    fn components(&self) -> GraphResult<Vec<ComponentId>>;
}
