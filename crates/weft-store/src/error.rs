use weft_types::ObjectHash;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required object was not found. Recoverable: the object may simply
    /// not have been fetched from a remote scope yet.
    #[error("object not found: {0}")]
    NotFound(ObjectHash),

    /// Stored bytes no longer hash to their key. Fatal: signals storage
    /// corruption and is never auto-repaired.
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: ObjectHash, computed: ObjectHash },

    /// The object envelope or payload is malformed and cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectHash, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for integrity errors that must abort a whole operation
    /// rather than a single component's step.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StoreError::HashMismatch { .. } | StoreError::CorruptObject { .. }
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
