//! Error types for diff and merge operations.

use thiserror::Error;
use weft_types::ObjectHash;

/// Errors that can occur while diffing or merging trees.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A referenced object was absent from the store.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectHash),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] weft_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
