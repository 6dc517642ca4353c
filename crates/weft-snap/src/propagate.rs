//! Auto-propagation: re-snap dependents of freshly snapped components.
//!
//! After a set of seed snaps, every workspace component whose recorded pin
//! for an updated dependency is now stale gets re-pinned and re-snapped, in
//! dependency order so each new version pins its dependencies' newest
//! hashes. Cycle detection runs before any snap: a cyclic dependency graph
//! aborts the whole pass with zero versions recorded.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};
use weft_types::{ComponentId, ObjectHash};

use crate::builder::{SnapBuilder, SnapReceipt};
use crate::depgraph::DependencyGraph;
use crate::error::{SnapError, SnapResult};
use crate::options::SnapOptions;
use crate::state::ComponentState;

/// One dependent that was automatically re-snapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoSnapped {
    pub receipt: SnapReceipt,
    /// The direct dependencies whose updates forced this snap.
    pub triggered_by: Vec<ComponentId>,
}

/// A dependent that could not be re-snapped for a per-component reason.
#[derive(Debug)]
pub struct SnapFailure {
    pub component: ComponentId,
    pub error: SnapError,
}

/// Outcome of one propagation pass.
#[derive(Debug, Default)]
pub struct AutoSnapResult {
    /// Dependents snapped, in the order they were processed.
    pub snapped: Vec<AutoSnapped>,
    /// Dependents skipped because of per-component policy errors.
    pub failures: Vec<SnapFailure>,
}

/// Re-snap every dependent of `seeds` whose pins went stale.
///
/// `states` holds the working copies of all workspace components, keyed by
/// `scope/path`. Per-component policy errors (unresolved issues, pipeline
/// failure, missing working copy) are collected in the result; structural
/// errors abort the pass.
pub fn propagate(
    builder: &SnapBuilder,
    graph: &DependencyGraph,
    seeds: &[SnapReceipt],
    states: &mut BTreeMap<String, ComponentState>,
    options: &SnapOptions,
) -> SnapResult<AutoSnapResult> {
    if let Some(cycle) = graph.find_cycle() {
        return Err(SnapError::DependencyCycleDetected { cycle });
    }

    // Newest version of everything updated so far in this pass.
    let mut updated: BTreeMap<String, ObjectHash> = seeds
        .iter()
        .map(|receipt| (receipt.component.full_name(), receipt.hash))
        .collect();

    let seed_ids: Vec<ComponentId> = seeds
        .iter()
        .map(|r| r.component.without_version())
        .collect();
    let mut pending: BTreeSet<String> = graph
        .dependent_closure(seed_ids.iter())
        .iter()
        .map(ComponentId::full_name)
        .collect();

    let mut result = AutoSnapResult::default();
    // Frontier loop: each round processes the components whose in-closure
    // dependencies are all settled. Acyclicity guarantees progress.
    while !pending.is_empty() {
        let ready: Vec<String> = pending
            .iter()
            .filter(|name| {
                graph
                    .dependencies_of(name)
                    .all(|dep| !pending.contains(&dep.full_name()))
            })
            .cloned()
            .collect();
        debug_assert!(!ready.is_empty(), "acyclic graph always has a frontier");

        for name in ready {
            pending.remove(&name);
            match snap_dependent(builder, graph, &name, &updated, states, options)? {
                Dependent::Snapped(auto) => {
                    updated.insert(name, auto.receipt.hash);
                    result.snapped.push(*auto);
                }
                Dependent::Unaffected => {}
                Dependent::Failed(failure) => {
                    warn!(
                        component = %failure.component,
                        error = %failure.error,
                        "auto-snap skipped"
                    );
                    result.failures.push(failure);
                }
            }
        }
    }

    info!(
        snapped = result.snapped.len(),
        failed = result.failures.len(),
        "propagation pass finished"
    );
    Ok(result)
}

fn registered_id(graph: &DependencyGraph, name: &str) -> ComponentId {
    graph
        .id_of(name)
        .cloned()
        .or_else(|| name.parse().ok())
        .unwrap_or_else(|| ComponentId::new("unknown", "unknown").expect("static id is valid"))
}

enum Dependent {
    Snapped(Box<AutoSnapped>),
    Unaffected,
    Failed(SnapFailure),
}

// Box keeps the happy-path variant small; unwrap at the call site.
impl Dependent {
    fn snapped(auto: AutoSnapped) -> Self {
        Self::Snapped(Box::new(auto))
    }
}

fn snap_dependent(
    builder: &SnapBuilder,
    graph: &DependencyGraph,
    name: &str,
    updated: &BTreeMap<String, ObjectHash>,
    states: &mut BTreeMap<String, ComponentState>,
    options: &SnapOptions,
) -> SnapResult<Dependent> {
    // Stale pins: direct dependencies updated this pass whose recorded pin
    // no longer names the newest hash.
    let Some(state) = states.get(name) else {
        // Can't inspect pins without a working copy; any updated direct
        // dependency makes this component affected.
        let affected = graph
            .dependencies_of(name)
            .any(|dep| updated.contains_key(&dep.full_name()));
        if !affected {
            return Ok(Dependent::Unaffected);
        }
        let component = registered_id(graph, name);
        return Ok(Dependent::Failed(SnapFailure {
            component: component.clone(),
            error: SnapError::MissingWorkingCopy(component),
        }));
    };
    let triggered_by: Vec<ComponentId> = graph
        .dependencies_of(name)
        .filter(|dep| {
            updated.get(&dep.full_name()).is_some_and(|newest| {
                state.pin_for(dep).map_or(true, |pin| pin.version != *newest)
            })
        })
        .cloned()
        .collect();
    if triggered_by.is_empty() {
        return Ok(Dependent::Unaffected);
    }

    let state = states.get_mut(name).expect("checked above");
    for dep in &triggered_by {
        let newest = updated[&dep.full_name()];
        state.pin_dependency(dep, newest);
    }

    let mut auto_options = options.clone();
    auto_options.message = format!(
        "{} (bump {})",
        options.message,
        triggered_by
            .iter()
            .map(ComponentId::full_name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    auto_options.tag = None;
    auto_options.unmodified = false;

    match builder.snap(state, &auto_options) {
        Ok(receipt) => Ok(Dependent::snapped(AutoSnapped {
            receipt,
            triggered_by,
        })),
        Err(error) if error.is_component_policy() => Ok(Dependent::Failed(SnapFailure {
            component: state.id.clone(),
            error,
        })),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use weft_graph::{InMemoryLaneStore, VersionGraph};
    use weft_store::{Author, InMemoryObjectStore};
    use weft_types::Lane;

    use super::*;
    use crate::issues::{ComponentIssue, IssueKind, NoIssues, StaticIssueChecker};
    use crate::pipeline::NoopPipeline;

    fn cid(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn builder() -> SnapBuilder {
        SnapBuilder::new(
            VersionGraph::new(
                Arc::new(InMemoryObjectStore::new()),
                Arc::new(InMemoryLaneStore::new()),
            ),
            Arc::new(NoIssues),
            Arc::new(NoopPipeline),
            Author::new("ada", "ada@example.com"),
            Lane::trunk(),
        )
    }

    fn builder_with_issues(checker: StaticIssueChecker) -> SnapBuilder {
        SnapBuilder::new(
            VersionGraph::new(
                Arc::new(InMemoryObjectStore::new()),
                Arc::new(InMemoryLaneStore::new()),
            ),
            Arc::new(checker),
            Arc::new(NoopPipeline),
            Author::new("ada", "ada@example.com"),
            Lane::trunk(),
        )
    }

    /// Workspace with a -> b -> c (c depends on b depends on a), everything
    /// snapped once so all pins are current.
    fn chain_workspace(
        builder: &SnapBuilder,
    ) -> (DependencyGraph, BTreeMap<String, ComponentState>) {
        let mut states = BTreeMap::new();
        let mut graph = DependencyGraph::new();

        let mut a = ComponentState::new(cid("acme/a"), BTreeMap::new());
        a.set_file("a.ts", b"a v1".to_vec());
        let a_receipt = builder.snap(&mut a, &SnapOptions::with_message("init a")).unwrap();
        graph.add_component(&a.id, []);

        let mut b = ComponentState::new(cid("acme/b"), BTreeMap::new());
        b.set_file("b.ts", b"b v1".to_vec());
        b.pin_dependency(&cid("acme/a"), a_receipt.hash);
        let b_receipt = builder.snap(&mut b, &SnapOptions::with_message("init b")).unwrap();
        graph.add_component(&b.id, [&cid("acme/a")]);

        let mut c = ComponentState::new(cid("acme/c"), BTreeMap::new());
        c.set_file("c.ts", b"c v1".to_vec());
        c.pin_dependency(&cid("acme/b"), b_receipt.hash);
        builder.snap(&mut c, &SnapOptions::with_message("init c")).unwrap();
        graph.add_component(&c.id, [&cid("acme/b")]);

        states.insert("acme/a".to_string(), a);
        states.insert("acme/b".to_string(), b);
        states.insert("acme/c".to_string(), c);
        (graph, states)
    }

    fn resnap_a(builder: &SnapBuilder, states: &mut BTreeMap<String, ComponentState>) -> SnapReceipt {
        let a = states.get_mut("acme/a").unwrap();
        a.set_file("a.ts", b"a v2".to_vec());
        builder.snap(a, &SnapOptions::with_message("edit a")).unwrap()
    }

    #[test]
    fn chain_propagates_in_dependency_order() {
        let builder = builder();
        let (graph, mut states) = chain_workspace(&builder);
        let seed = resnap_a(&builder, &mut states);

        let result = propagate(
            &builder,
            &graph,
            &[seed.clone()],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap();

        assert!(result.failures.is_empty());
        assert_eq!(result.snapped.len(), 2);

        // b first, triggered directly by a.
        let b = &result.snapped[0];
        assert_eq!(b.receipt.component.full_name(), "acme/b");
        assert_eq!(b.triggered_by, vec![cid("acme/a")]);
        assert_eq!(
            b.receipt.version.pin_for(&cid("acme/a")).unwrap().version,
            seed.hash
        );

        // c second, triggered by b's fresh version (not by a).
        let c = &result.snapped[1];
        assert_eq!(c.receipt.component.full_name(), "acme/c");
        assert_eq!(c.triggered_by, vec![cid("acme/b")]);
        assert_eq!(
            c.receipt.version.pin_for(&cid("acme/b")).unwrap().version,
            b.receipt.hash
        );
    }

    #[test]
    fn unaffected_components_are_left_alone() {
        let builder = builder();
        let (mut graph, mut states) = chain_workspace(&builder);

        // An unrelated component in the workspace.
        let mut lone = ComponentState::new(cid("acme/lone"), BTreeMap::new());
        lone.set_file("l.ts", b"lone".to_vec());
        builder.snap(&mut lone, &SnapOptions::with_message("init lone")).unwrap();
        graph.add_component(&lone.id, []);
        states.insert("acme/lone".to_string(), lone);

        let seed = resnap_a(&builder, &mut states);
        let result = propagate(
            &builder,
            &graph,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap();

        assert!(result
            .snapped
            .iter()
            .all(|s| s.receipt.component.full_name() != "acme/lone"));
        assert_eq!(states["acme/lone"].base, builder
            .graph()
            .head_of(&cid("acme/lone"), &Lane::trunk())
            .unwrap());
    }

    #[test]
    fn cycle_aborts_with_zero_snaps() {
        let builder = builder();
        let (_, mut states) = chain_workspace(&builder);
        let seed = resnap_a(&builder, &mut states);
        let heads_before: Vec<_> = ["acme/a", "acme/b", "acme/c"]
            .iter()
            .map(|n| builder.graph().head_of(&cid(n), &Lane::trunk()).unwrap())
            .collect();

        let mut cyclic = DependencyGraph::new();
        cyclic.add_component(&cid("acme/a"), [&cid("acme/c")]);
        cyclic.add_component(&cid("acme/b"), [&cid("acme/a")]);
        cyclic.add_component(&cid("acme/c"), [&cid("acme/b")]);

        let err = propagate(
            &builder,
            &cyclic,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap_err();
        assert!(matches!(err, SnapError::DependencyCycleDetected { .. }));

        // No dependent head moved.
        let heads_after: Vec<_> = ["acme/a", "acme/b", "acme/c"]
            .iter()
            .map(|n| builder.graph().head_of(&cid(n), &Lane::trunk()).unwrap())
            .collect();
        assert_eq!(heads_before, heads_after);
    }

    #[test]
    fn policy_failure_is_collected_not_fatal() {
        let mut checker = StaticIssueChecker::new();
        checker.add(
            "acme/b",
            ComponentIssue::new(IssueKind::UntrackedDependency, "stray import"),
        );
        let builder = builder_with_issues(checker);
        let (graph, mut states) = chain_workspace(&builder);
        let seed = resnap_a(&builder, &mut states);

        let result = propagate(
            &builder,
            &graph,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap();

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].component.full_name(), "acme/b");
        assert!(matches!(
            result.failures[0].error,
            SnapError::UnresolvedIssues { .. }
        ));
        // c's pin on b did not go stale (b never advanced), so c is skipped.
        assert!(result.snapped.is_empty());
    }

    #[test]
    fn missing_working_copy_is_reported() {
        let builder = builder();
        let (graph, mut states) = chain_workspace(&builder);
        let seed = resnap_a(&builder, &mut states);
        states.remove("acme/b");

        let result = propagate(
            &builder,
            &graph,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap();
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            result.failures[0].error,
            SnapError::MissingWorkingCopy(_)
        ));
    }

    #[test]
    fn already_current_pin_is_not_resnapped() {
        let builder = builder();
        let (graph, mut states) = chain_workspace(&builder);
        let seed = resnap_a(&builder, &mut states);

        // b already re-pinned and re-snapped by hand.
        {
            let b = states.get_mut("acme/b").unwrap();
            b.pin_dependency(&cid("acme/a"), seed.hash);
            builder.snap(b, &SnapOptions::with_message("manual bump")).unwrap();
        }

        let result = propagate(
            &builder,
            &graph,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit a"),
        )
        .unwrap();
        // b is current; nothing in the pass re-snaps it. c's pin on b is
        // stale only relative to the manual snap, which is outside this
        // pass's seed set.
        assert!(result
            .snapped
            .iter()
            .all(|s| s.receipt.component.full_name() != "acme/b"));
    }

    #[test]
    fn diamond_dependent_snaps_once_with_both_triggers() {
        let builder = builder();
        let mut graph = DependencyGraph::new();
        let mut states = BTreeMap::new();

        let mut base = ComponentState::new(cid("acme/base"), BTreeMap::new());
        base.set_file("base.ts", b"v1".to_vec());
        let base_v1 = builder.snap(&mut base, &SnapOptions::with_message("init")).unwrap();
        graph.add_component(&base.id, []);

        let mut left = ComponentState::new(cid("acme/left"), BTreeMap::new());
        left.set_file("left.ts", b"v1".to_vec());
        left.pin_dependency(&cid("acme/base"), base_v1.hash);
        let left_v1 = builder.snap(&mut left, &SnapOptions::with_message("init")).unwrap();
        graph.add_component(&left.id, [&cid("acme/base")]);

        let mut right = ComponentState::new(cid("acme/right"), BTreeMap::new());
        right.set_file("right.ts", b"v1".to_vec());
        right.pin_dependency(&cid("acme/base"), base_v1.hash);
        let right_v1 = builder.snap(&mut right, &SnapOptions::with_message("init")).unwrap();
        graph.add_component(&right.id, [&cid("acme/base")]);

        let mut top = ComponentState::new(cid("acme/top"), BTreeMap::new());
        top.set_file("top.ts", b"v1".to_vec());
        top.pin_dependency(&cid("acme/left"), left_v1.hash);
        top.pin_dependency(&cid("acme/right"), right_v1.hash);
        builder.snap(&mut top, &SnapOptions::with_message("init")).unwrap();
        graph.add_component(&top.id, [&cid("acme/left"), &cid("acme/right")]);

        states.insert("acme/base".to_string(), base);
        states.insert("acme/left".to_string(), left);
        states.insert("acme/right".to_string(), right);
        states.insert("acme/top".to_string(), top);

        let seed = {
            let base = states.get_mut("acme/base").unwrap();
            base.set_file("base.ts", b"v2".to_vec());
            builder.snap(base, &SnapOptions::with_message("edit base")).unwrap()
        };

        let result = propagate(
            &builder,
            &graph,
            &[seed],
            &mut states,
            &SnapOptions::with_message("edit base"),
        )
        .unwrap();

        assert_eq!(result.snapped.len(), 3);
        let top_snap = result
            .snapped
            .iter()
            .find(|s| s.receipt.component.full_name() == "acme/top")
            .expect("top snapped");
        let mut triggers: Vec<_> = top_snap.triggered_by.iter().map(ComponentId::full_name).collect();
        triggers.sort();
        assert_eq!(triggers, vec!["acme/left", "acme/right"]);
        // Top snapped exactly once.
        assert_eq!(
            result
                .snapped
                .iter()
                .filter(|s| s.receipt.component.full_name() == "acme/top")
                .count(),
            1
        );
    }
}
