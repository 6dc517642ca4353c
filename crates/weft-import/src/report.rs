//! Per-component and aggregate import outcomes.

use weft_types::ComponentId;

use crate::options::MergeStrategy;

/// What happened to one component during an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportStatus {
    /// Local head already matches or is ahead of the remote.
    UpToDate,
    /// The component was not tracked locally; it is now.
    Added,
    /// Local history was a prefix of remote history; the head moved forward.
    FastForwarded,
    /// Histories diverged and no merge strategy was given. Objects were
    /// fetched; the working copy and head are untouched.
    MergePending,
    /// Histories diverged and were merged per the given strategy. The merge
    /// is recorded by the component's next snap.
    Merged { strategy: MergeStrategy, clean: bool },
    /// Objects-only import; nothing else was inspected.
    ObjectsFetched,
}

/// One component's import outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentImport {
    /// The component, pointing at the head the import left in place.
    pub component: ComponentId,
    pub status: ImportStatus,
    /// Version objects newly copied from the remote.
    pub versions_fetched: usize,
    /// Paths left with conflict markers (manual merges only), sorted.
    pub conflicts: Vec<String>,
}

/// Aggregate outcome of one import run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// The remote scope imported from.
    pub scope: String,
    /// Per-component outcomes, in processing order.
    pub components: Vec<ComponentImport>,
}

impl ImportReport {
    /// Total version objects copied from the remote.
    pub fn versions_fetched(&self) -> usize {
        self.components.iter().map(|c| c.versions_fetched).sum()
    }

    /// Returns `true` if any component is waiting on conflict resolution.
    pub fn has_conflicts(&self) -> bool {
        self.components.iter().any(|c| !c.conflicts.is_empty())
    }

    /// Returns `true` if any component diverged without a strategy.
    pub fn has_pending_merges(&self) -> bool {
        self.components
            .iter()
            .any(|c| c.status == ImportStatus::MergePending)
    }
}
