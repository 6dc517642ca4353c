//! Content-addressed object storage for weft.
//!
//! This crate implements the hash-keyed object store that backs every
//! component's history. Every piece of durable data — file contents, file
//! trees, version records — is stored as an immutable object identified by a
//! domain-separated, truncated BLAKE3 hash.
//!
//! # Object Types
//!
//! - [`Blob`] — raw content (component source file bytes)
//! - [`FileTree`] — mapping from relative file path to blob hash, the full
//!   state of a component's sources at one version
//! - [`VersionObject`] — a node in a component's history ("snap")
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] — `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] — flat directory of content-hashed files; writes are
//!   atomic (temp file + rename) and durable before `write` returns
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: re-writing identical content is a no-op.
//! 3. Reads verify the content hash; a mismatch is fatal corruption
//!    ([`StoreError::HashMismatch`]), distinct from an absent object.
//! 4. The store never interprets object contents — it is a pure key-value
//!    store keyed by content hash.

pub mod error;
pub mod fs;
pub mod hasher;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use hasher::ContentHasher;
pub use memory::InMemoryObjectStore;
pub use object::{
    Author, Blob, DependencyPin, FileTree, ObjectKind, StoredObject, VersionObject,
};
pub use traits::ObjectStore;
