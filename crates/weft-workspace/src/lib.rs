//! The weft workspace: on-disk orchestration of snapping and importing.
//!
//! A workspace is a directory with a `weft.json` manifest, component source
//! directories, and a `.weft/` metadata directory holding the object store,
//! the lane head table and per-component sync points. [`Workspace`] wires
//! the engine crates to that layout:
//!
//! - `snap` — record changed working copies as new versions, then re-snap
//!   dependents whose pins went stale
//! - `import` — fetch components from a remote scope and reconcile working
//!   copies, including merge handling for diverged histories
//! - `status` / `log` — inspect divergence and history

pub mod error;
pub mod manifest;
pub mod sync_state;
pub mod workspace;

pub use error::{WorkspaceError, WorkspaceResult};
pub use manifest::{AuthorConfig, ComponentEntry, WorkspaceManifest, MANIFEST_FILE};
pub use sync_state::SyncState;
pub use workspace::{
    ComponentStatus, SnapSummary, Workspace, WorkspaceSnapOptions, WEFT_DIR,
};
