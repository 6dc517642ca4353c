//! The snap builder: turn a working copy into a recorded version.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use weft_graph::VersionGraph;
use weft_store::{Author, Blob, FileTree, ObjectStore, VersionObject};
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::change::detect_changes;
use crate::error::{SnapError, SnapResult};
use crate::issues::IssueChecker;
use crate::options::SnapOptions;
use crate::pipeline::PipelineRunner;
use crate::state::ComponentState;

/// What one successful snap produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapReceipt {
    /// The component id pointing at the new version.
    pub component: ComponentId,
    /// Hash of the new version object.
    pub hash: ObjectHash,
    /// The recorded version object.
    pub version: VersionObject,
    /// Returns `true` if this was the component's first version.
    pub first_version: bool,
}

/// Assembles and persists version objects.
///
/// The builder owns the snap sequence: option validation, change detection,
/// issue gate, pipeline gate, then the write path (blobs, tree, version
/// object, head advance). Everything before the write path is read-only, so
/// a rejected snap leaves no trace.
pub struct SnapBuilder {
    graph: VersionGraph,
    issues: Arc<dyn IssueChecker>,
    pipeline: Arc<dyn PipelineRunner>,
    author: Author,
    lane: Lane,
}

impl SnapBuilder {
    pub fn new(
        graph: VersionGraph,
        issues: Arc<dyn IssueChecker>,
        pipeline: Arc<dyn PipelineRunner>,
        author: Author,
        lane: Lane,
    ) -> Self {
        Self {
            graph,
            issues,
            pipeline,
            author,
            lane,
        }
    }

    /// The version graph this builder records into.
    pub fn graph(&self) -> &VersionGraph {
        &self.graph
    }

    /// The lane new versions land on.
    pub fn lane(&self) -> &Lane {
        &self.lane
    }

    /// Snap one component.
    ///
    /// On success the working copy's `base` advances to the new version and
    /// any pending merge is cleared. On error nothing is recorded and the
    /// state is untouched.
    pub fn snap(
        &self,
        state: &mut ComponentState,
        options: &SnapOptions,
    ) -> SnapResult<SnapReceipt> {
        options.validate()?;

        let report = detect_changes(&self.graph, state)?;
        if !report.has_changes() && !options.unmodified && state.merging.is_none() {
            return Err(SnapError::NothingToSnap(state.id.clone()));
        }

        let blocking = options.ignore_issues.blocking(self.issues.issues(state));
        if !blocking.is_empty() {
            return Err(SnapError::UnresolvedIssues {
                component: state.id.clone(),
                issues: blocking,
            });
        }

        if options.pipeline_enabled() {
            let outcome = self.pipeline.run(state, options.skip_tests);
            if !outcome.passed {
                if options.force_deploy {
                    debug!(
                        component = %state.id,
                        "pipeline failed, recording anyway (force-deploy)"
                    );
                } else {
                    return Err(SnapError::PipelineFailure {
                        component: state.id.clone(),
                        diagnostics: outcome.diagnostics,
                    });
                }
            }
        }

        // Write path starts here. Blobs and tree are content-addressed, so
        // a later failure leaves only unreferenced objects behind.
        let store = self.graph.store();
        let mut tree = FileTree::empty();
        for (path, content) in &state.files {
            let blob = store.write(&Blob::new(content.clone()).to_stored_object())?;
            tree.insert(path.clone(), blob);
        }
        let tree_hash = store.write(&tree.to_stored_object()?)?;

        let head = self.graph.head_of(&state.id, &self.lane)?;
        let mut parents: Vec<ObjectHash> = head.into_iter().collect();
        if let Some(merging) = state.merging {
            if !parents.contains(&merging) {
                parents.push(merging);
            }
        }

        let version = VersionObject::new(
            self.author.clone(),
            options.message.clone(),
            Utc::now().timestamp_millis(),
            tree_hash,
            parents,
            state.dependencies.clone(),
            options.tag.clone(),
        );
        let hash = self.graph.append(&state.id, &self.lane, &version)?;

        let first_version = head.is_none();
        state.base = Some(hash);
        state.merging = None;
        info!(
            component = %state.id,
            version = %hash.short_hex(),
            first = first_version,
            merge = version.is_merge(),
            "snapped"
        );
        Ok(SnapReceipt {
            component: state.id.with_version(hash.to_hex()),
            hash,
            version,
            first_version,
        })
    }
}

impl std::fmt::Debug for SnapBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapBuilder")
            .field("lane", &self.lane)
            .finish_non_exhaustive()
    }
}
