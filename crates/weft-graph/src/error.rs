//! Error types for version graph operations.

use thiserror::Error;
use weft_types::{ComponentId, Lane, ObjectHash};

/// Errors that can occur during version graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The lane head moved concurrently, or the appended version does not
    /// descend from the current head. The caller must re-read the head and
    /// retry; nothing was advanced.
    #[error("non-linear update on {component} lane '{lane}': head is {actual:?}, expected {expected:?}")]
    NonLinearUpdate {
        component: ComponentId,
        lane: Lane,
        expected: Option<ObjectHash>,
        actual: Option<ObjectHash>,
    },

    /// A declared parent hash does not exist in the object store.
    #[error("missing parent {parent} for {component}")]
    MissingParent {
        component: ComponentId,
        parent: ObjectHash,
    },

    /// A stored hash did not resolve to a version object.
    #[error("version not found: {0}")]
    VersionNotFound(ObjectHash),

    /// Underlying object store failure.
    #[error(transparent)]
    Store(#[from] weft_store::StoreError),

    /// The persisted head table is malformed.
    #[error("corrupt head table: {0}")]
    CorruptHeadTable(String),

    /// I/O error from a file-backed lane store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
