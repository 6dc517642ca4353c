//! Error types for import operations.

use thiserror::Error;
use weft_types::{ComponentId, ObjectHash};

/// Errors that can occur while importing from a remote scope.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Mutually exclusive options were combined. Rejected before any fetch.
    #[error("invalid flag combination: {0}")]
    InvalidFlagCombination(String),

    /// The remote scope has no history for the requested component.
    #[error("component {component} not found on remote scope '{scope}'")]
    ComponentNotFound {
        component: ComponentId,
        scope: String,
    },

    /// The remote advertised an object it could not serve.
    #[error("remote scope '{scope}' is missing object {hash}")]
    MissingRemoteObject { scope: String, hash: ObjectHash },

    /// Version graph failure.
    #[error(transparent)]
    Graph(#[from] weft_graph::GraphError),

    /// Object store failure.
    #[error(transparent)]
    Store(#[from] weft_store::StoreError),

    /// Merge failure.
    #[error(transparent)]
    Diff(#[from] weft_diff::DiffError),
}

/// Convenience alias for import results.
pub type ImportResult<T> = Result<T, ImportError>;
