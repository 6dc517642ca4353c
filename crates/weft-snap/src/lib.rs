//! Snapshot engine for weft.
//!
//! This crate turns working copies into immutable version objects:
//!
//! - [`ComponentState`] — the mutable in-workspace source tree plus the
//!   version it was last synced from
//! - [`change`] — deterministic, side-effect-free change detection against
//!   the based-on version (file content and dependency pin drift)
//! - [`SnapBuilder`] — assembles and persists a new version object and
//!   advances the lane head, all-or-nothing
//! - [`propagate`] — re-snaps the transitive dependents of freshly snapped
//!   components in dependency order, with cycle detection
//!
//! External collaborators ([`IssueChecker`], [`PipelineRunner`]) are trait
//! seams; the engine ships only pass-through implementations.
//!
//! [`propagate`]: propagate::propagate

pub mod builder;
pub mod change;
pub mod depgraph;
pub mod error;
pub mod issues;
pub mod options;
pub mod pipeline;
pub mod propagate;
pub mod state;

pub use builder::{SnapBuilder, SnapReceipt};
pub use change::{detect_changes, ChangeReport};
pub use depgraph::DependencyGraph;
pub use error::{SnapError, SnapResult};
pub use issues::{ComponentIssue, IssueChecker, IssueFilter, IssueKind, NoIssues, StaticIssueChecker};
pub use options::SnapOptions;
pub use pipeline::{NoopPipeline, PipelineOutcome, PipelineRunner};
pub use propagate::{propagate, AutoSnapResult, AutoSnapped, SnapFailure};
pub use state::ComponentState;
