//! Read-only snapshot of the workspace dependency graph.
//!
//! Auto-propagation needs a consistent view of who depends on whom while it
//! runs; the graph is built once from the workspace's declared dependencies
//! and never mutated during propagation.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use weft_types::ComponentId;

/// Directed dependency edges between workspace components, keyed by the
/// version-less `scope/path` name.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// component -> its direct dependencies
    deps: BTreeMap<String, BTreeSet<String>>,
    /// component -> its direct dependents (reverse edges)
    dependents: BTreeMap<String, BTreeSet<String>>,
    ids: BTreeMap<String, ComponentId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component and its direct dependencies. Dependencies on
    /// components outside the graph are recorded too; they simply have no
    /// dependents of their own.
    pub fn add_component<'a>(
        &mut self,
        id: &ComponentId,
        dependencies: impl IntoIterator<Item = &'a ComponentId>,
    ) {
        let name = id.full_name();
        self.ids.insert(name.clone(), id.without_version());
        self.deps.entry(name.clone()).or_default();
        for dep in dependencies {
            let dep_name = dep.full_name();
            self.ids
                .entry(dep_name.clone())
                .or_insert_with(|| dep.without_version());
            self.deps
                .entry(name.clone())
                .or_default()
                .insert(dep_name.clone());
            self.dependents.entry(dep_name).or_default().insert(name.clone());
        }
    }

    /// The registered id for a `scope/path` name.
    pub fn id_of(&self, name: &str) -> Option<&ComponentId> {
        self.ids.get(name)
    }

    /// Direct dependencies of `name`, sorted.
    pub fn dependencies_of(&self, name: &str) -> impl Iterator<Item = &ComponentId> {
        self.deps
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|n| self.ids.get(n))
    }

    /// Direct dependents of `name`, sorted.
    pub fn dependents_of(&self, name: &str) -> impl Iterator<Item = &ComponentId> {
        self.dependents
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|n| self.ids.get(n))
    }

    /// All components transitively depending on any of `roots` (the roots
    /// themselves excluded), sorted by name.
    pub fn dependent_closure<'a>(
        &self,
        roots: impl IntoIterator<Item = &'a ComponentId>,
    ) -> Vec<ComponentId> {
        let mut seen: BTreeSet<String> = roots.into_iter().map(ComponentId::full_name).collect();
        let roots_set = seen.clone();
        let mut queue: VecDeque<String> = seen.iter().cloned().collect();
        while let Some(name) = queue.pop_front() {
            for dependent in self.dependents.get(&name).into_iter().flatten() {
                if seen.insert(dependent.clone()) {
                    queue.push_back(dependent.clone());
                }
            }
        }
        seen.into_iter()
            .filter(|name| !roots_set.contains(name))
            .filter_map(|name| self.ids.get(&name).cloned())
            .collect()
    }

    /// Find a dependency cycle reachable from any registered component, if
    /// one exists. Returns the cycle as a closed path (first id repeated at
    /// the end is omitted).
    pub fn find_cycle(&self) -> Option<Vec<ComponentId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
        let mut stack: Vec<&str> = Vec::new();

        // Iterative DFS; a back edge to an in-progress node closes a cycle.
        for start in self.deps.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            let mut work: Vec<(&str, bool)> = vec![(start, false)];
            while let Some((node, children_done)) = work.pop() {
                if children_done {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                }
                match marks.get(node) {
                    Some(Mark::Done) => continue,
                    Some(Mark::InProgress) => continue,
                    None => {}
                }
                marks.insert(node, Mark::InProgress);
                stack.push(node);
                work.push((node, true));
                for next in self.deps.get(node).into_iter().flatten() {
                    match marks.get(next.as_str()) {
                        Some(Mark::InProgress) => {
                            let from = stack.iter().position(|n| *n == next).unwrap_or(0);
                            return Some(
                                stack[from..]
                                    .iter()
                                    .filter_map(|n| self.ids.get(*n).cloned())
                                    .collect(),
                            );
                        }
                        Some(Mark::Done) => {}
                        None => work.push((next, false)),
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn chain() -> DependencyGraph {
        // c depends on b depends on a
        let mut graph = DependencyGraph::new();
        graph.add_component(&cid("acme/a"), []);
        graph.add_component(&cid("acme/b"), [&cid("acme/a")]);
        graph.add_component(&cid("acme/c"), [&cid("acme/b")]);
        graph
    }

    #[test]
    fn direct_edges() {
        let graph = chain();
        let deps: Vec<_> = graph.dependencies_of("acme/b").map(|id| id.full_name()).collect();
        assert_eq!(deps, vec!["acme/a"]);
        let dependents: Vec<_> = graph.dependents_of("acme/a").map(|id| id.full_name()).collect();
        assert_eq!(dependents, vec!["acme/b"]);
    }

    #[test]
    fn closure_is_transitive_and_excludes_roots() {
        let graph = chain();
        let closure = graph.dependent_closure([&cid("acme/a")]);
        let names: Vec<_> = closure.iter().map(ComponentId::full_name).collect();
        assert_eq!(names, vec!["acme/b", "acme/c"]);
    }

    #[test]
    fn closure_of_leaf_is_empty() {
        let graph = chain();
        assert!(graph.dependent_closure([&cid("acme/c")]).is_empty());
    }

    #[test]
    fn diamond_closure_lists_each_component_once() {
        // d depends on b and c; both depend on a
        let mut graph = DependencyGraph::new();
        graph.add_component(&cid("acme/a"), []);
        graph.add_component(&cid("acme/b"), [&cid("acme/a")]);
        graph.add_component(&cid("acme/c"), [&cid("acme/a")]);
        graph.add_component(&cid("acme/d"), [&cid("acme/b"), &cid("acme/c")]);

        let names: Vec<_> = graph
            .dependent_closure([&cid("acme/a")])
            .iter()
            .map(ComponentId::full_name)
            .collect();
        assert_eq!(names, vec!["acme/b", "acme/c", "acme/d"]);
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        assert!(chain().find_cycle().is_none());
    }

    #[test]
    fn two_node_cycle_is_found() {
        let mut graph = DependencyGraph::new();
        graph.add_component(&cid("acme/a"), [&cid("acme/b")]);
        graph.add_component(&cid("acme/b"), [&cid("acme/a")]);

        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.len(), 2);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_component(&cid("acme/a"), [&cid("acme/a")]);
        let cycle = graph.find_cycle().expect("cycle");
        assert_eq!(cycle.len(), 1);
    }

    #[test]
    fn cycle_detection_ignores_unrelated_acyclic_parts() {
        let mut graph = chain();
        graph.add_component(&cid("acme/x"), [&cid("acme/y")]);
        graph.add_component(&cid("acme/y"), [&cid("acme/x")]);
        let cycle = graph.find_cycle().expect("cycle");
        let names: BTreeSet<_> = cycle.iter().map(ComponentId::full_name).collect();
        assert!(names.contains("acme/x") && names.contains("acme/y"));
    }
}
