//! File tree diffing and merging for weft.
//!
//! Two pieces:
//!
//! - [`tree_diff`] — compare two [`FileTree`] snapshots and list additions,
//!   removals, and modifications; drives change reporting.
//! - [`merge`] — per-file three-way merge (base / ours / theirs) used by the
//!   import resolver. Files changed on only one side resolve automatically;
//!   files changed on both sides with different content become conflicts
//!   rendered with conflict markers for manual resolution.
//!
//! [`FileTree`]: weft_store::FileTree

pub mod error;
pub mod merge;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use merge::{merge_trees, MergedFile, TreeMerge};
pub use tree_diff::{diff_trees, TreeChange, TreeDiff};
