//! Importing components from remote scopes.
//!
//! An import copies a component's objects from a remote scope into the
//! local store, then reconciles the local head and working copy:
//!
//! - [`RemoteScope`] — read access to a remote's heads and objects
//! - [`Importer`] — the fetch-then-reconcile engine
//! - [`MergeStrategy`] — how diverged histories are resolved (`theirs`,
//!   `ours`, or a manual three-way merge with conflict markers)
//! - [`ImportReport`] — what happened, per component
//!
//! Diverged histories are never resolved implicitly: without a strategy the
//! import fetches objects, reports [`ImportStatus::MergePending`] and leaves
//! the head and working copy untouched.

pub mod error;
pub mod importer;
pub mod options;
pub mod remote;
pub mod report;

pub use error::{ImportError, ImportResult};
pub use importer::Importer;
pub use options::{ImportOptions, MergeStrategy};
pub use remote::{FsRemoteScope, InMemoryRemoteScope, RemoteScope};
pub use report::{ComponentImport, ImportReport, ImportStatus};
