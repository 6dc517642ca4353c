use serde::{Deserialize, Serialize};
use weft_types::{ComponentId, ObjectHash};

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (component source file bytes).
    Blob,
    /// Mapping from relative file path to blob hash.
    Tree,
    /// A version record ("snap") in a component's history.
    Version,
}

impl ObjectKind {
    /// Parse from the envelope header token.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "version" => Some(Self::Version),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Version => write!(f, "version"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload — it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed hash for this object.
    ///
    /// Uses the domain-separated hasher matching the object kind.
    pub fn compute_hash(&self) -> ObjectHash {
        let hasher = match self.kind {
            ObjectKind::Blob => &ContentHasher::BLOB,
            ObjectKind::Tree => &ContentHasher::TREE,
            ObjectKind::Version => &ContentHasher::VERSION,
        };
        hasher.hash(&self.data)
    }

    /// Encode as the on-disk envelope: `"<kind> <size>\n"` then payload.
    pub fn to_envelope(&self) -> Vec<u8> {
        let header = format!("{} {}\n", self.kind, self.size);
        let mut bytes = Vec::with_capacity(header.len() + self.data.len());
        bytes.extend_from_slice(header.as_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }

    /// Decode from the on-disk envelope.
    ///
    /// `id` is only used for error reporting.
    pub fn from_envelope(id: ObjectHash, bytes: &[u8]) -> StoreResult<Self> {
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id,
            reason: reason.into(),
        };
        let newline = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| corrupt("missing envelope header"))?;
        let header =
            std::str::from_utf8(&bytes[..newline]).map_err(|_| corrupt("non-utf8 header"))?;
        let (kind_str, size_str) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;
        let kind = ObjectKind::parse(kind_str)
            .ok_or_else(|| corrupt(&format!("unknown object kind '{kind_str}'")))?;
        let size: u64 = size_str
            .parse()
            .map_err(|_| corrupt("malformed size field"))?;
        let data = bytes[newline + 1..].to_vec();
        if data.len() as u64 != size {
            return Err(corrupt("payload length does not match header size"));
        }
        Ok(Self { kind, data, size })
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object: the bytes of one component source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The hash this blob's content addresses to, without storing it.
    pub fn hash_of(data: &[u8]) -> ObjectHash {
        ContentHasher::BLOB.hash(data)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::CorruptObject {
                id: obj.compute_hash(),
                reason: format!("expected blob, got {}", obj.kind),
            });
        }
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// FileTree
// ---------------------------------------------------------------------------

/// Mapping from relative file path to blob hash: the full state of a
/// component's sources at one version.
///
/// Unchanged files across versions share the same blob object (deduplication
/// via content addressing). The map is a `BTreeMap` so serialization is
/// deterministic and the tree hash is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTree {
    pub files: std::collections::BTreeMap<String, ObjectHash>,
}

impl FileTree {
    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a tree from an iterator of `(path, blob hash)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ObjectHash)>) -> Self {
        Self {
            files: entries.into_iter().collect(),
        }
    }

    /// Record a file at `path` pointing at `blob`.
    pub fn insert(&mut self, path: impl Into<String>, blob: ObjectHash) {
        self.files.insert(path.into(), blob);
    }

    /// Look up a file's blob hash by path.
    pub fn get(&self, path: &str) -> Option<&ObjectHash> {
        self.files.get(path)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the tree has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The hash this tree addresses to, without storing it.
    pub fn compute_hash(&self) -> StoreResult<ObjectHash> {
        Ok(self.to_stored_object()?.compute_hash())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(StoreError::CorruptObject {
                id: obj.compute_hash(),
                reason: format!("expected tree, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// VersionObject
// ---------------------------------------------------------------------------

/// Author identity recorded on a version object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A component's recorded dependency at snap time: the dependency's identity
/// pinned to the exact version object it resolved to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyPin {
    /// The dependency's identity (version-less).
    pub component: ComponentId,
    /// The version object hash this dependency was resolved to.
    pub version: ObjectHash,
}

impl DependencyPin {
    pub fn new(component: ComponentId, version: ObjectHash) -> Self {
        Self {
            component: component.without_version(),
            version,
        }
    }
}

/// A node in a component's history: one immutable, hash-addressed version
/// record ("snap").
///
/// The object's own hash is computed over every field below — mutating any
/// field produces a different object, never an edit. Normally a version has
/// one parent; a snap that finalizes a merge has two.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionObject {
    /// Who created this version.
    pub author: Author,
    /// Log message describing the change.
    pub message: String,
    /// Creation time, UTC milliseconds since the epoch.
    pub timestamp_ms: i64,
    /// Hash of the file tree snapshot at this version.
    pub tree: ObjectHash,
    /// Parent version hashes (empty for an initial version, two for a merge).
    pub parents: Vec<ObjectHash>,
    /// Dependency resolution snapshot at this version, sorted by component.
    pub dependencies: Vec<DependencyPin>,
    /// Optional human-readable release label, distinct from the content hash.
    pub tag: Option<String>,
}

impl VersionObject {
    /// Assemble a version object, normalizing dependency order so the hash
    /// is deterministic.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        author: Author,
        message: impl Into<String>,
        timestamp_ms: i64,
        tree: ObjectHash,
        parents: Vec<ObjectHash>,
        mut dependencies: Vec<DependencyPin>,
        tag: Option<String>,
    ) -> Self {
        dependencies.sort();
        Self {
            author,
            message: message.into(),
            timestamp_ms,
            tree,
            parents,
            dependencies,
            tag,
        }
    }

    /// Returns `true` if this is an initial (parentless) version.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this version finalizes a merge (two parents).
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The recorded pin for a dependency, if this version depends on it.
    pub fn pin_for(&self, component: &ComponentId) -> Option<&DependencyPin> {
        self.dependencies
            .iter()
            .find(|pin| pin.component.same_component(component))
    }

    /// The hash this version addresses to, without storing it.
    pub fn compute_hash(&self) -> StoreResult<ObjectHash> {
        Ok(self.to_stored_object()?.compute_hash())
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Version, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Version {
            return Err(StoreError::CorruptObject {
                id: obj.compute_hash(),
                reason: format!("expected version, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
