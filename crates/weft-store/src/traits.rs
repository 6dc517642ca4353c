use weft_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written; content-addressing guarantees that
///   the same data always produces the same hash.
/// - `write` is idempotent: re-writing identical content returns the same
///   hash and does not duplicate storage.
/// - Durable backends must make the object visible to subsequent `read`s
///   before `write` returns (no torn writes).
/// - `read` verifies content integrity; a stored object whose bytes no
///   longer match its key is reported as [`StoreError::HashMismatch`].
/// - Concurrent reads are always safe (objects are immutable).
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed hash.
    ///
    /// Returns `Ok(None)` if the object does not exist — a normal, expected
    /// outcome for objects not yet fetched from a remote scope.
    fn read(&self, id: &ObjectHash) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed hash.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectHash>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectHash) -> StoreResult<bool>;

    /// Read an object that is required to exist, mapping absence to
    /// [`StoreError::NotFound`].
    fn read_required(&self, id: &ObjectHash) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each hash. Backends may
    /// override for fewer I/O round-trips.
    fn read_batch(&self, ids: &[ObjectHash]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their hashes.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectHash>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
