//! Error types for the snapshot engine.

use thiserror::Error;
use weft_types::ComponentId;

use crate::issues::ComponentIssue;

/// Errors that can occur while snapping components.
#[derive(Debug, Error)]
pub enum SnapError {
    /// The component has no changes and `unmodified` was not set.
    #[error("nothing to snap for {0}: no changes since the last version")]
    NothingToSnap(ComponentId),

    /// The component has unresolved issues not covered by the ignore list.
    #[error("{component} has {} unresolved issue(s)", issues.len())]
    UnresolvedIssues {
        component: ComponentId,
        issues: Vec<ComponentIssue>,
    },

    /// The build/test pipeline reported failure and no override was set.
    #[error("pipeline failed for {component}: {diagnostics}")]
    PipelineFailure {
        component: ComponentId,
        diagnostics: String,
    },

    /// Mutually exclusive options were combined. Rejected before any side
    /// effect.
    #[error("invalid flag combination: {0}")]
    InvalidFlagCombination(String),

    /// The dependency graph contains a cycle; propagation performs no snaps.
    #[error("dependency cycle detected: {}", format_cycle(cycle))]
    DependencyCycleDetected { cycle: Vec<ComponentId> },

    /// A dependent selected for auto-snap has no working copy in this
    /// workspace.
    #[error("no working copy for {0}")]
    MissingWorkingCopy(ComponentId),

    /// Version graph failure (non-linear update, missing parent, ...).
    #[error(transparent)]
    Graph(#[from] weft_graph::GraphError),

    /// Object store failure.
    #[error(transparent)]
    Store(#[from] weft_store::StoreError),
}

impl SnapError {
    /// Per-component policy errors abort only that component's snap in a
    /// multi-component run; everything else aborts the whole operation.
    pub fn is_component_policy(&self) -> bool {
        matches!(
            self,
            SnapError::NothingToSnap(_)
                | SnapError::UnresolvedIssues { .. }
                | SnapError::PipelineFailure { .. }
                | SnapError::MissingWorkingCopy(_)
        )
    }
}

fn format_cycle(cycle: &[ComponentId]) -> String {
    cycle
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Convenience alias for snap results.
pub type SnapResult<T> = Result<T, SnapError>;
