//! Error types for workspace operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while operating on a workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No `weft.json` at or above the given directory.
    #[error("no workspace manifest found at {0}")]
    ManifestNotFound(PathBuf),

    /// The manifest or state file failed to parse.
    #[error("malformed workspace file {path}: {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    /// A directory cannot be initialized because it already is a workspace.
    #[error("{0} is already a weft workspace")]
    AlreadyInitialized(PathBuf),

    /// The manifest does not track a component by this name.
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// A workspace-wide snap found no changed components.
    #[error("nothing to snap: no components changed")]
    NothingToSnap,

    /// Component identity failure.
    #[error(transparent)]
    Types(#[from] weft_types::TypeError),

    /// Snap engine failure.
    #[error(transparent)]
    Snap(#[from] weft_snap::SnapError),

    /// Import failure.
    #[error(transparent)]
    Import(#[from] weft_import::ImportError),

    /// Version graph failure.
    #[error(transparent)]
    Graph(#[from] weft_graph::GraphError),

    /// Object store failure.
    #[error(transparent)]
    Store(#[from] weft_store::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias for workspace results.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
