//! Per-component version graphs for weft.
//!
//! Every component has its own independent history: an append-only DAG of
//! version objects, tracked by per-lane head pointers. This crate provides
//! the head-pointer storage ([`LaneStore`]) and the [`VersionGraph`] API on
//! top of it:
//!
//! - `head_of` — current head of a component's lane
//! - `append` — validate parents, persist the version object, then advance
//!   the head via compare-and-swap; losing a race yields
//!   [`GraphError::NonLinearUpdate`] so concurrent work is never silently
//!   discarded
//! - `history` — lazy, restartable, newest-first walk over parent pointers
//!
//! Head advancement is the only mutation; version objects themselves live in
//! the content-addressed object store and are immutable.

pub mod error;
pub mod fs;
pub mod graph;
pub mod memory;
pub mod traits;

pub use error::{GraphError, GraphResult};
pub use fs::FsLaneStore;
pub use graph::{History, VersionGraph};
pub use memory::InMemoryLaneStore;
pub use traits::LaneStore;
