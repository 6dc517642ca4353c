use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, trace};
use weft_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Filesystem object store: a flat directory of content-hashed files.
///
/// Each object lives at `<root>/<40-hex-hash>` wrapped in the
/// `"<kind> <size>\n"` envelope. Writes go through a temp file in the same
/// directory, are fsynced, then renamed into place — an object is either
/// fully present or absent, never torn, and is durable before `write`
/// returns. Reads re-hash the payload and report a mismatch as fatal
/// corruption.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectHash) -> PathBuf {
        self.root.join(id.to_hex())
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectHash) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = StoredObject::from_envelope(*id, &bytes)?;
        let computed = object.compute_hash();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        trace!(id = %id.short_hex(), kind = %object.kind, "read object");
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectHash> {
        let id = object.compute_hash();
        let path = self.object_path(&id);
        // Idempotent: an existing file already holds identical content.
        if path.exists() {
            return Ok(id);
        }
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&object.to_envelope())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "wrote object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectHash) -> StoreResult<bool> {
        Ok(self.object_path(id).exists())
    }
}

impl std::fmt::Debug for FsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsObjectStore")
            .field("root", &self.root)
            .finish()
    }
}
