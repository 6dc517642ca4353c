//! The importer: fetch remote objects and reconcile local state.
//!
//! An import is two phases. The fetch phase copies version, tree and blob
//! objects from the remote into the local store, stopping at locally-known
//! versions unless full history was requested; content addressing makes
//! re-fetching idempotent. The reconcile phase then classifies each
//! component — up to date, new, fast-forwardable, or diverged — and updates
//! the head, working copy and sync point accordingly. A diverged component
//! is never resolved implicitly: without an explicit strategy the import
//! reports it and leaves everything local untouched.

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, info};
use weft_diff::merge_trees;
use weft_graph::VersionGraph;
use weft_snap::ComponentState;
use weft_store::{Blob, FileTree, ObjectStore, StoreError, VersionObject};
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::{ImportError, ImportResult};
use crate::options::{ImportOptions, MergeStrategy};
use crate::remote::RemoteScope;
use crate::report::{ComponentImport, ImportReport, ImportStatus};

/// Imports components from remote scopes into a local graph.
pub struct Importer {
    graph: VersionGraph,
    lane: Lane,
}

impl Importer {
    pub fn new(graph: VersionGraph, lane: Lane) -> Self {
        Self { graph, lane }
    }

    /// Import components from `remote`.
    ///
    /// With no explicit ids, every component the remote publishes is
    /// imported. `states` holds the workspace's working copies keyed by
    /// `scope/path`; new components gain an entry, updated ones are edited
    /// in place.
    pub fn import(
        &self,
        remote: &dyn RemoteScope,
        states: &mut BTreeMap<String, ComponentState>,
        options: &ImportOptions,
    ) -> ImportResult<ImportReport> {
        options.validate()?;
        let ids: Vec<ComponentId> = if options.ids.is_empty() {
            remote.list()?
        } else {
            options.ids.iter().map(ComponentId::without_version).collect()
        };

        let mut report = ImportReport {
            scope: remote.name().to_string(),
            components: Vec::new(),
        };
        for id in ids {
            report
                .components
                .push(self.import_component(remote, &id, states, options)?);
        }
        info!(
            scope = report.scope,
            components = report.components.len(),
            versions = report.versions_fetched(),
            "import finished"
        );
        Ok(report)
    }

    /// Import a single component from `remote`.
    pub fn import_component(
        &self,
        remote: &dyn RemoteScope,
        id: &ComponentId,
        states: &mut BTreeMap<String, ComponentState>,
        options: &ImportOptions,
    ) -> ImportResult<ComponentImport> {
        let id = id.without_version();
        let remote_head = remote.head_of(&id, &self.lane)?.ok_or_else(|| {
            ImportError::ComponentNotFound {
                component: id.clone(),
                scope: remote.name().to_string(),
            }
        })?;

        let versions_fetched = self.fetch_closure(remote, remote_head, options.all_history)?;
        debug!(
            component = %id,
            versions = versions_fetched,
            "fetched remote objects"
        );
        if options.objects_only {
            return Ok(ComponentImport {
                component: id.with_version(remote_head.to_hex()),
                status: ImportStatus::ObjectsFetched,
                versions_fetched,
                conflicts: Vec::new(),
            });
        }

        let local_head = self.graph.head_of(&id, &self.lane)?;
        let (status, conflicts) = match local_head {
            None => {
                self.check_out(&id, remote_head, states)?;
                (ImportStatus::Added, Vec::new())
            }
            Some(local) if local == remote_head => (ImportStatus::UpToDate, Vec::new()),
            Some(local) if self.graph.is_ancestor(&remote_head, &local)? => {
                // Local history already contains the remote head.
                (ImportStatus::UpToDate, Vec::new())
            }
            Some(local) if self.graph.is_ancestor(&local, &remote_head)? => {
                let conflicts = self.fast_forward(&id, local, remote_head, states, options)?;
                (ImportStatus::FastForwarded, conflicts)
            }
            Some(local) => match options.merge {
                None => (ImportStatus::MergePending, Vec::new()),
                Some(strategy) => {
                    let conflicts =
                        self.merge_diverged(&id, local, remote_head, strategy, states)?;
                    let clean = conflicts.is_empty();
                    (ImportStatus::Merged { strategy, clean }, conflicts)
                }
            },
        };

        let head_after = self.graph.head_of(&id, &self.lane)?.unwrap_or(remote_head);
        Ok(ComponentImport {
            component: id.with_version(head_after.to_hex()),
            status,
            versions_fetched,
            conflicts,
        })
    }

    /// Copy everything reachable from `head` out of the remote into the
    /// local store. Returns the number of version objects newly written.
    fn fetch_closure(
        &self,
        remote: &dyn RemoteScope,
        head: ObjectHash,
        all_history: bool,
    ) -> ImportResult<usize> {
        let store = self.graph.store();
        let mut fetched = 0;
        let mut queue = VecDeque::from([head]);
        let mut seen = std::collections::HashSet::from([head]);
        while let Some(hash) = queue.pop_front() {
            let known = store.exists(&hash)?;
            if known && !all_history {
                continue;
            }
            let version = if known {
                VersionObject::from_stored_object(&store.read_required(&hash)?)?
            } else {
                let obj = self.fetch_object(remote, &hash)?;
                let version = VersionObject::from_stored_object(&obj)?;
                store.write(&obj)?;
                fetched += 1;
                version
            };
            if !store.exists(&version.tree)? {
                let tree_obj = self.fetch_object(remote, &version.tree)?;
                let tree = FileTree::from_stored_object(&tree_obj)?;
                for blob_hash in tree.files.values() {
                    if !store.exists(blob_hash)? {
                        store.write(&self.fetch_object(remote, blob_hash)?)?;
                    }
                }
                store.write(&tree_obj)?;
            }
            for parent in &version.parents {
                if seen.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
        }
        Ok(fetched)
    }

    /// Fetch one object and verify it hashes to what was asked for.
    fn fetch_object(
        &self,
        remote: &dyn RemoteScope,
        hash: &ObjectHash,
    ) -> ImportResult<weft_store::StoredObject> {
        let obj = remote
            .fetch(hash)?
            .ok_or_else(|| ImportError::MissingRemoteObject {
                scope: remote.name().to_string(),
                hash: *hash,
            })?;
        let computed = obj.compute_hash();
        if computed != *hash {
            return Err(StoreError::HashMismatch {
                id: *hash,
                computed,
            }
            .into());
        }
        Ok(obj)
    }

    /// First-time checkout: head, working copy and sync point all move to
    /// the remote head.
    fn check_out(
        &self,
        id: &ComponentId,
        remote_head: ObjectHash,
        states: &mut BTreeMap<String, ComponentState>,
    ) -> ImportResult<()> {
        self.graph
            .lanes()
            .compare_and_swap(id, &self.lane, None, remote_head)?;
        let (files, version) = self.materialize(&remote_head)?;
        let mut state = ComponentState::new(id.clone(), files);
        state.base = Some(remote_head);
        state.dependencies = version.dependencies;
        states.insert(id.full_name(), state);
        Ok(())
    }

    /// Advance a local head that is a strict ancestor of the remote head.
    ///
    /// An unmodified (or overridden) working copy is replaced with the
    /// remote tree. Uncommitted local edits go through the strategy
    /// dispatch: `theirs` discards them, `ours` keeps the local file
    /// contents, `manual` (or no strategy) three-way merges against the old
    /// sync point with conflict markers. Either way the head and sync point
    /// land on the remote head and no merge snap is needed, so `merging`
    /// stays clear.
    fn fast_forward(
        &self,
        id: &ComponentId,
        local_head: ObjectHash,
        remote_head: ObjectHash,
        states: &mut BTreeMap<String, ComponentState>,
        options: &ImportOptions,
    ) -> ImportResult<Vec<String>> {
        self.graph
            .lanes()
            .compare_and_swap(id, &self.lane, Some(local_head), remote_head)?;

        let Some(state) = states.get_mut(&id.full_name()) else {
            // Tracked in the graph but absent from the workspace: treat as a
            // fresh checkout of the new head.
            let (files, version) = self.materialize(&remote_head)?;
            let mut state = ComponentState::new(id.clone(), files);
            state.base = Some(remote_head);
            state.dependencies = version.dependencies;
            states.insert(id.full_name(), state);
            return Ok(Vec::new());
        };

        let (remote_files, remote_version) = self.materialize(&remote_head)?;
        let base_tree = match state.base {
            Some(base) => Some(self.load_tree(&self.graph.load_version(&base)?.tree)?),
            None => None,
        };
        let unchanged = match (&base_tree, state.tree()?.compute_hash()?) {
            (Some(tree), current) => tree.compute_hash()? == current,
            (None, _) => false,
        };

        let mut conflicts = Vec::new();
        if unchanged || options.override_local {
            state.files = remote_files;
            state.dependencies = remote_version.dependencies;
        } else {
            match options.merge {
                Some(MergeStrategy::Theirs) => {
                    state.files = remote_files;
                    state.dependencies = remote_version.dependencies;
                }
                Some(MergeStrategy::Ours) => {}
                Some(MergeStrategy::Manual) | None => {
                    let remote_tree = self.load_tree(&remote_version.tree)?;
                    let merge = merge_trees(
                        self.graph.store().as_ref(),
                        base_tree.as_ref(),
                        &state.files,
                        &remote_tree,
                    )?;
                    conflicts = merge.conflicts().iter().map(|p| p.to_string()).collect();
                    state.files = merge
                        .files
                        .into_iter()
                        .map(|(path, merged)| (path, merged.content().to_vec()))
                        .collect();
                }
            }
        }
        state.base = Some(remote_head);
        Ok(conflicts)
    }

    /// Reconcile a diverged component per `strategy`.
    ///
    /// The head stays on the local version; the remote head is parked in
    /// `merging` so the component's next snap records both parents and joins
    /// the histories.
    fn merge_diverged(
        &self,
        id: &ComponentId,
        local_head: ObjectHash,
        remote_head: ObjectHash,
        strategy: MergeStrategy,
        states: &mut BTreeMap<String, ComponentState>,
    ) -> ImportResult<Vec<String>> {
        if !states.contains_key(&id.full_name()) {
            // No working copy: reconstruct one from the local head so the
            // strategy has a local side to work with.
            let (files, version) = self.materialize(&local_head)?;
            let mut state = ComponentState::new(id.clone(), files);
            state.base = Some(local_head);
            state.dependencies = version.dependencies;
            states.insert(id.full_name(), state);
        }
        let state = states.get_mut(&id.full_name()).expect("inserted above");

        let (remote_files, remote_version) = self.materialize(&remote_head)?;
        let mut conflicts = Vec::new();
        match strategy {
            MergeStrategy::Theirs => {
                state.files = remote_files;
                state.dependencies = remote_version.dependencies;
            }
            MergeStrategy::Ours => {}
            MergeStrategy::Manual => {
                let base_tree = match self.graph.merge_base(&local_head, &remote_head)? {
                    Some(base) => Some(self.load_tree(&self.graph.load_version(&base)?.tree)?),
                    None => None,
                };
                let remote_tree = self.load_tree(&remote_version.tree)?;
                let merge = merge_trees(
                    self.graph.store().as_ref(),
                    base_tree.as_ref(),
                    &state.files,
                    &remote_tree,
                )?;
                conflicts = merge.conflicts().iter().map(|p| p.to_string()).collect();
                state.files = merge
                    .files
                    .into_iter()
                    .map(|(path, merged)| (path, merged.content().to_vec()))
                    .collect();
            }
        }
        state.merging = Some(remote_head);
        Ok(conflicts)
    }

    /// Read a version's full working-copy contents out of the local store.
    fn materialize(
        &self,
        version_hash: &ObjectHash,
    ) -> ImportResult<(BTreeMap<String, Vec<u8>>, VersionObject)> {
        let version = self.graph.load_version(version_hash)?;
        let tree = self.load_tree(&version.tree)?;
        let store = self.graph.store();
        let mut files = BTreeMap::new();
        for (path, blob_hash) in &tree.files {
            let blob = Blob::from_stored_object(&store.read_required(blob_hash)?)?;
            files.insert(path.clone(), blob.data);
        }
        Ok((files, version))
    }

    fn load_tree(&self, hash: &ObjectHash) -> ImportResult<FileTree> {
        let store = self.graph.store();
        Ok(FileTree::from_stored_object(&store.read_required(hash)?)?)
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("lane", &self.lane)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use weft_graph::InMemoryLaneStore;
    use weft_snap::{NoIssues, NoopPipeline, SnapBuilder, SnapOptions, SnapReceipt};
    use weft_store::{Author, InMemoryObjectStore};

    use super::*;
    use crate::remote::InMemoryRemoteScope;

    fn cid(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn local_graph() -> VersionGraph {
        VersionGraph::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryLaneStore::new()),
        )
    }

    fn builder_for(graph: &VersionGraph) -> SnapBuilder {
        SnapBuilder::new(
            graph.clone(),
            Arc::new(NoIssues),
            Arc::new(NoopPipeline),
            Author::new("ada", "ada@example.com"),
            Lane::trunk(),
        )
    }

    /// Snap one version of `id` onto `graph` with the given file contents.
    fn snap_onto(
        graph: &VersionGraph,
        state: &mut ComponentState,
        message: &str,
    ) -> SnapReceipt {
        builder_for(graph)
            .snap(state, &SnapOptions::with_message(message))
            .unwrap()
    }

    /// Remote scope publishing `acme/button` with a one-file working copy.
    fn published_remote(content: &[u8]) -> (InMemoryRemoteScope, ComponentState, SnapReceipt) {
        let remote = InMemoryRemoteScope::new("acme");
        let mut state = ComponentState::new(cid("acme/button"), BTreeMap::new());
        state.set_file("index.ts", content.to_vec());
        let receipt = snap_onto(remote.graph(), &mut state, "publish");
        (remote, state, receipt)
    }

    #[test]
    fn new_component_is_checked_out() {
        let (remote, _, receipt) = published_remote(b"export {}");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        assert_eq!(report.components.len(), 1);
        let entry = &report.components[0];
        assert_eq!(entry.status, ImportStatus::Added);
        assert_eq!(entry.versions_fetched, 1);
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(receipt.hash)
        );
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"export {}");
        assert_eq!(state.base, Some(receipt.hash));
    }

    #[test]
    fn reimport_is_up_to_date_and_fetches_nothing() {
        let (remote, _, _) = published_remote(b"export {}");
        let importer = Importer::new(local_graph(), Lane::trunk());
        let mut states = BTreeMap::new();

        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        assert_eq!(report.components[0].status, ImportStatus::UpToDate);
        assert_eq!(report.versions_fetched(), 0);
    }

    #[test]
    fn local_ahead_is_up_to_date() {
        let (remote, _, _) = published_remote(b"export {}");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        // Advance locally past the remote head.
        let state = states.get_mut("acme/button").unwrap();
        state.set_file("index.ts", b"local edit".to_vec());
        let local = snap_onto(&graph, state, "local work");

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        assert_eq!(report.components[0].status, ImportStatus::UpToDate);
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(local.hash)
        );
    }

    #[test]
    fn remote_advance_fast_forwards() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        remote_state.set_file("index.ts", b"v2".to_vec());
        let v2 = snap_onto(remote.graph(), &mut remote_state, "second");

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        let entry = &report.components[0];
        assert_eq!(entry.status, ImportStatus::FastForwarded);
        assert!(entry.conflicts.is_empty());
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(v2.hash)
        );
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"v2");
        assert_eq!(state.base, Some(v2.hash));
        assert_eq!(state.merging, None);
    }

    #[test]
    fn fast_forward_preserves_unrelated_local_edits() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        // Local uncommitted edit on a different file.
        states
            .get_mut("acme/button")
            .unwrap()
            .set_file("notes.md", b"local only".to_vec());

        remote_state.set_file("index.ts", b"v2".to_vec());
        snap_onto(remote.graph(), &mut remote_state, "second");

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        assert_eq!(report.components[0].status, ImportStatus::FastForwarded);
        assert!(report.components[0].conflicts.is_empty());
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"v2");
        assert_eq!(state.files["notes.md"], b"local only");
    }

    #[test]
    fn theirs_fast_forward_discards_local_edits() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        states
            .get_mut("acme/button")
            .unwrap()
            .set_file("index.ts", b"local edit".to_vec());
        remote_state.set_file("index.ts", b"v2".to_vec());
        let v2 = snap_onto(remote.graph(), &mut remote_state, "second");

        let options = ImportOptions {
            merge: Some(MergeStrategy::Theirs),
            ..ImportOptions::default()
        };
        let report = importer.import(&remote, &mut states, &options).unwrap();
        let entry = &report.components[0];
        assert_eq!(entry.status, ImportStatus::FastForwarded);
        assert!(entry.conflicts.is_empty());

        // Working copy is byte-identical to the remote tree.
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"v2");
        assert_eq!(state.base, Some(v2.hash));
        assert_eq!(state.merging, None);
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(v2.hash)
        );
    }

    #[test]
    fn ours_fast_forward_keeps_local_contents() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        states
            .get_mut("acme/button")
            .unwrap()
            .set_file("index.ts", b"local edit".to_vec());
        remote_state.set_file("index.ts", b"v2".to_vec());
        let v2 = snap_onto(remote.graph(), &mut remote_state, "second");

        let options = ImportOptions {
            merge: Some(MergeStrategy::Ours),
            ..ImportOptions::default()
        };
        let report = importer.import(&remote, &mut states, &options).unwrap();
        assert_eq!(report.components[0].status, ImportStatus::FastForwarded);

        // Head and base advance, the edited file stays as written locally.
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"local edit");
        assert_eq!(state.base, Some(v2.hash));
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(v2.hash)
        );
    }

    #[test]
    fn override_discards_local_edits() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let importer = Importer::new(local_graph(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        states
            .get_mut("acme/button")
            .unwrap()
            .set_file("notes.md", b"local only".to_vec());
        remote_state.set_file("index.ts", b"v2".to_vec());
        snap_onto(remote.graph(), &mut remote_state, "second");

        let options = ImportOptions {
            override_local: true,
            ..ImportOptions::default()
        };
        importer.import(&remote, &mut states, &options).unwrap();
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"v2");
        assert!(!state.files.contains_key("notes.md"));
    }

    /// Both sides snap after a common root: local head and remote head
    /// diverge.
    fn diverged_setup() -> (
        InMemoryRemoteScope,
        VersionGraph,
        Importer,
        BTreeMap<String, ComponentState>,
        SnapReceipt,
    ) {
        let (remote, mut remote_state, _) = published_remote(b"root");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        let local_state = states.get_mut("acme/button").unwrap();
        local_state.set_file("index.ts", b"local side".to_vec());
        let local = snap_onto(&graph, local_state, "local work");

        remote_state.set_file("index.ts", b"remote side".to_vec());
        snap_onto(remote.graph(), &mut remote_state, "remote work");

        (remote, graph, importer, states, local)
    }

    #[test]
    fn diverged_without_strategy_is_pending() {
        let (remote, graph, importer, mut states, local) = diverged_setup();

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        assert_eq!(report.components[0].status, ImportStatus::MergePending);
        assert!(report.has_pending_merges());

        // Objects fetched, everything local untouched.
        assert!(report.components[0].versions_fetched > 0);
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(local.hash)
        );
        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"local side");
        assert_eq!(state.merging, None);
    }

    #[test]
    fn diverged_theirs_takes_remote_files_and_parks_merge() {
        let (remote, graph, importer, mut states, local) = diverged_setup();
        let remote_head = remote
            .head_of(&cid("acme/button"), &Lane::trunk())
            .unwrap()
            .unwrap();

        let options = ImportOptions {
            merge: Some(MergeStrategy::Theirs),
            ..ImportOptions::default()
        };
        let report = importer.import(&remote, &mut states, &options).unwrap();
        assert_eq!(
            report.components[0].status,
            ImportStatus::Merged {
                strategy: MergeStrategy::Theirs,
                clean: true
            }
        );

        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"remote side");
        assert_eq!(state.merging, Some(remote_head));

        // The next snap joins the histories with two parents.
        let merge = snap_onto(&graph, states.get_mut("acme/button").unwrap(), "merge");
        assert!(merge.version.is_merge());
        assert!(merge.version.parents.contains(&local.hash));
        assert!(merge.version.parents.contains(&remote_head));
    }

    #[test]
    fn diverged_ours_keeps_local_files_and_parks_merge() {
        let (remote, _, importer, mut states, _) = diverged_setup();

        let options = ImportOptions {
            merge: Some(MergeStrategy::Ours),
            ..ImportOptions::default()
        };
        importer.import(&remote, &mut states, &options).unwrap();

        let state = &states["acme/button"];
        assert_eq!(state.files["index.ts"], b"local side");
        assert!(state.merging.is_some());
    }

    #[test]
    fn diverged_manual_leaves_conflict_markers() {
        let (remote, _, importer, mut states, _) = diverged_setup();

        let options = ImportOptions {
            merge: Some(MergeStrategy::Manual),
            ..ImportOptions::default()
        };
        let report = importer.import(&remote, &mut states, &options).unwrap();
        let entry = &report.components[0];
        assert_eq!(
            entry.status,
            ImportStatus::Merged {
                strategy: MergeStrategy::Manual,
                clean: false
            }
        );
        assert_eq!(entry.conflicts, vec!["index.ts"]);
        assert!(report.has_conflicts());

        let content =
            String::from_utf8(states["acme/button"].files["index.ts"].clone()).unwrap();
        assert!(content.contains("<<<<<<< ours"));
        assert!(content.contains("local side"));
        assert!(content.contains("remote side"));
    }

    #[test]
    fn objects_only_touches_nothing_local() {
        let (remote, _, receipt) = published_remote(b"export {}");
        let graph = local_graph();
        let importer = Importer::new(graph.clone(), Lane::trunk());
        let mut states = BTreeMap::new();

        let options = ImportOptions {
            objects_only: true,
            ..ImportOptions::default()
        };
        let report = importer.import(&remote, &mut states, &options).unwrap();

        assert_eq!(report.components[0].status, ImportStatus::ObjectsFetched);
        assert!(graph.store().exists(&receipt.hash).unwrap());
        assert!(states.is_empty());
        assert_eq!(
            graph.head_of(&cid("acme/button"), &Lane::trunk()).unwrap(),
            None
        );
    }

    #[test]
    fn fetch_stops_at_known_versions() {
        let (remote, mut remote_state, _) = published_remote(b"v1");
        let importer = Importer::new(local_graph(), Lane::trunk());
        let mut states = BTreeMap::new();
        importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();

        remote_state.set_file("index.ts", b"v2".to_vec());
        snap_onto(remote.graph(), &mut remote_state, "second");
        remote_state.set_file("index.ts", b"v3".to_vec());
        snap_onto(remote.graph(), &mut remote_state, "third");

        let report = importer
            .import(&remote, &mut states, &ImportOptions::default())
            .unwrap();
        // v1 is already local; only v2 and v3 cross the wire.
        assert_eq!(report.versions_fetched(), 2);
    }

    #[test]
    fn unknown_component_is_an_error() {
        let (remote, _, _) = published_remote(b"export {}");
        let importer = Importer::new(local_graph(), Lane::trunk());
        let mut states = BTreeMap::new();

        let options = ImportOptions::for_ids([cid("acme/ghost")]);
        let err = importer.import(&remote, &mut states, &options).unwrap_err();
        assert!(matches!(err, ImportError::ComponentNotFound { .. }));
    }

    #[test]
    fn explicit_id_imports_only_that_component() {
        let (remote, _, _) = published_remote(b"export {}");
        let mut other = ComponentState::new(cid("acme/card"), BTreeMap::new());
        other.set_file("card.ts", b"card".to_vec());
        snap_onto(remote.graph(), &mut other, "publish card");

        let importer = Importer::new(local_graph(), Lane::trunk());
        let mut states = BTreeMap::new();
        let options = ImportOptions::for_ids([cid("acme/card")]);
        let report = importer.import(&remote, &mut states, &options).unwrap();

        assert_eq!(report.components.len(), 1);
        assert_eq!(report.components[0].component.full_name(), "acme/card");
        assert!(!states.contains_key("acme/button"));
    }
}
