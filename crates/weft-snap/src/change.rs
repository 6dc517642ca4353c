//! Change detection: has this working copy diverged from its based-on
//! version?
//!
//! Pure reads, no writes. A component changed when its working-copy tree
//! hash differs from the based-on version's tree hash, or when its current
//! dependency pins differ from the pins that version recorded. A component
//! with no base has never been snapped and always counts as changed.

use weft_graph::VersionGraph;

use crate::error::SnapResult;
use crate::state::ComponentState;

/// What, if anything, diverged from the based-on version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// No previous version exists.
    pub new_component: bool,
    /// The file tree hash differs.
    pub files_changed: bool,
    /// The dependency pin set differs.
    pub dependencies_changed: bool,
}

impl ChangeReport {
    /// Returns `true` if a snap would record something new.
    pub fn has_changes(&self) -> bool {
        self.new_component || self.files_changed || self.dependencies_changed
    }
}

/// Compare a working copy against its based-on version.
pub fn detect_changes(graph: &VersionGraph, state: &ComponentState) -> SnapResult<ChangeReport> {
    let Some(base) = state.base else {
        return Ok(ChangeReport {
            new_component: true,
            ..ChangeReport::default()
        });
    };
    let based_on = graph.load_version(&base)?;
    let tree_hash = state.tree()?.compute_hash()?;
    Ok(ChangeReport {
        new_component: false,
        files_changed: tree_hash != based_on.tree,
        dependencies_changed: state.dependencies != based_on.dependencies,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use weft_graph::InMemoryLaneStore;
    use weft_store::{Author, InMemoryObjectStore, VersionObject};
    use weft_types::{ComponentId, Lane, ObjectHash};

    use super::*;

    fn graph() -> VersionGraph {
        VersionGraph::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryLaneStore::new()),
        )
    }

    fn snap_base(graph: &VersionGraph, state: &mut ComponentState) -> ObjectHash {
        let version = VersionObject::new(
            Author::new("ada", "ada@example.com"),
            "base",
            1_700_000_000_000,
            state.tree().unwrap().compute_hash().unwrap(),
            vec![],
            state.dependencies.clone(),
            None,
        );
        let hash = graph.append(&state.id, &Lane::trunk(), &version).unwrap();
        state.base = Some(hash);
        hash
    }

    fn cid(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    #[test]
    fn never_snapped_component_is_changed() {
        let graph = graph();
        let state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        let report = detect_changes(&graph, &state).unwrap();
        assert!(report.new_component);
        assert!(report.has_changes());
    }

    #[test]
    fn untouched_working_copy_is_unchanged() {
        let graph = graph();
        let mut state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        state.set_file("index.ts", b"one".to_vec());
        snap_base(&graph, &mut state);
        assert!(!detect_changes(&graph, &state).unwrap().has_changes());
    }

    #[test]
    fn edited_file_is_detected() {
        let graph = graph();
        let mut state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        state.set_file("index.ts", b"one".to_vec());
        snap_base(&graph, &mut state);

        state.set_file("index.ts", b"two".to_vec());
        let report = detect_changes(&graph, &state).unwrap();
        assert!(report.files_changed);
        assert!(!report.dependencies_changed);
    }

    #[test]
    fn repinned_dependency_is_detected_without_file_edits() {
        let graph = graph();
        let mut state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        state.set_file("index.ts", b"one".to_vec());
        state.pin_dependency(&cid("acme/theme"), ObjectHash::of_bytes(b"v1"));
        snap_base(&graph, &mut state);

        state.pin_dependency(&cid("acme/theme"), ObjectHash::of_bytes(b"v2"));
        let report = detect_changes(&graph, &state).unwrap();
        assert!(!report.files_changed);
        assert!(report.dependencies_changed);
    }

    #[test]
    fn edit_then_revert_is_unchanged() {
        let graph = graph();
        let mut state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        state.set_file("index.ts", b"one".to_vec());
        snap_base(&graph, &mut state);

        state.set_file("index.ts", b"two".to_vec());
        state.set_file("index.ts", b"one".to_vec());
        assert!(!detect_changes(&graph, &state).unwrap().has_changes());
    }
}
