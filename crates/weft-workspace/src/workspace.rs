//! The workspace: an on-disk directory of component sources plus the local
//! object store, head table and sync state under `.weft/`.
//!
//! Layout:
//!
//! ```text
//! <root>/weft.json          manifest (scope, author, tracked components)
//! <root>/.weft/objects/     content-addressed object store
//! <root>/.weft/heads.json   lane head table
//! <root>/.weft/state.json   per-component sync points
//! <root>/<component dirs>   working copies
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use weft_diff::{diff_trees, TreeDiff};
use weft_graph::{FsLaneStore, VersionGraph};
use weft_import::{ImportOptions, ImportReport, ImportStatus, Importer, RemoteScope};
use weft_snap::{
    detect_changes, propagate, AutoSnapped, ComponentState, DependencyGraph, IssueChecker,
    NoIssues, NoopPipeline, PipelineRunner, SnapBuilder, SnapFailure, SnapOptions, SnapReceipt,
};
use weft_store::{Author, FileTree, FsObjectStore, ObjectStore, VersionObject};
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::manifest::{ComponentEntry, WorkspaceManifest, MANIFEST_FILE};
use crate::sync_state::SyncState;

/// Workspace metadata directory.
pub const WEFT_DIR: &str = ".weft";

/// Options for a workspace-level snap run.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceSnapOptions {
    /// Component name to snap. `None` snaps every changed component.
    pub target: Option<String>,
    /// Per-snap options forwarded to the engine.
    pub snap: SnapOptions,
    /// Do not re-snap dependents of what was just snapped.
    pub skip_auto_snap: bool,
}

/// Outcome of one workspace snap run.
#[derive(Debug, Default)]
pub struct SnapSummary {
    /// Explicitly requested (or changed) components that were snapped.
    pub snapped: Vec<SnapReceipt>,
    /// Dependents re-snapped by propagation.
    pub auto_snapped: Vec<AutoSnapped>,
    /// Components skipped for per-component policy reasons.
    pub failures: Vec<SnapFailure>,
}

impl SnapSummary {
    /// Receipts for components that got their first version.
    pub fn new_components(&self) -> impl Iterator<Item = &SnapReceipt> {
        self.snapped.iter().filter(|r| r.first_version)
    }

    /// Receipts for components that already had history.
    pub fn changed_components(&self) -> impl Iterator<Item = &SnapReceipt> {
        self.snapped.iter().filter(|r| !r.first_version)
    }

    /// Total versions recorded, seeds and propagation together.
    pub fn total(&self) -> usize {
        self.snapped.len() + self.auto_snapped.len()
    }
}

/// One component's divergence from its last recorded version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentStatus {
    pub id: ComponentId,
    /// Head of the active lane, if any history exists.
    pub head: Option<ObjectHash>,
    pub new_component: bool,
    pub files_changed: bool,
    pub dependencies_changed: bool,
    /// Per-file drift from the based-on version's tree.
    pub changes: TreeDiff,
    /// Recorded pins that no longer name their dependency's current head.
    pub stale_pins: Vec<ComponentId>,
    /// An import left a merge waiting for its resolving snap.
    pub merge_pending: bool,
}

impl ComponentStatus {
    /// Returns `true` if a snap would record something.
    pub fn is_dirty(&self) -> bool {
        self.new_component
            || self.files_changed
            || self.dependencies_changed
            || !self.stale_pins.is_empty()
            || self.merge_pending
    }
}

/// An opened workspace.
pub struct Workspace {
    root: PathBuf,
    manifest: WorkspaceManifest,
    graph: VersionGraph,
    lane: Lane,
    issues: Arc<dyn IssueChecker>,
    pipeline: Arc<dyn PipelineRunner>,
}

impl Workspace {
    /// Create a new workspace at `root`.
    pub fn init(root: impl Into<PathBuf>, scope: impl Into<String>) -> WorkspaceResult<Self> {
        let root = root.into();
        if root.join(MANIFEST_FILE).exists() {
            return Err(WorkspaceError::AlreadyInitialized(root));
        }
        fs::create_dir_all(root.join(WEFT_DIR))?;
        let manifest = WorkspaceManifest::new(scope);
        manifest.save(&root)?;
        info!(root = %root.display(), scope = manifest.scope, "initialized workspace");
        Self::open(root)
    }

    /// Open the workspace at `root`.
    pub fn open(root: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let root = root.into();
        let manifest = WorkspaceManifest::load(&root)?;
        let store = FsObjectStore::open(root.join(WEFT_DIR).join("objects"))?;
        let lanes = FsLaneStore::open(root.join(WEFT_DIR).join("heads.json"))?;
        Ok(Self {
            root,
            manifest,
            graph: VersionGraph::new(Arc::new(store), Arc::new(lanes)),
            lane: Lane::trunk(),
            issues: Arc::new(NoIssues),
            pipeline: Arc::new(NoopPipeline),
        })
    }

    /// Replace the issue checker used before every snap.
    pub fn with_issue_checker(mut self, issues: Arc<dyn IssueChecker>) -> Self {
        self.issues = issues;
        self
    }

    /// Replace the pipeline run before every snap.
    pub fn with_pipeline(mut self, pipeline: Arc<dyn PipelineRunner>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Work against a lane other than trunk.
    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lane = lane;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &WorkspaceManifest {
        &self.manifest
    }

    pub fn graph(&self) -> &VersionGraph {
        &self.graph
    }

    pub fn lane(&self) -> &Lane {
        &self.lane
    }

    /// Track a new component directory.
    pub fn track(
        &mut self,
        name: impl Into<String>,
        entry: ComponentEntry,
    ) -> WorkspaceResult<()> {
        let name = name.into();
        fs::create_dir_all(self.root.join(&entry.path))?;
        self.manifest.add_component(name, entry);
        self.manifest.save(&self.root)
    }

    /// Snap components per `options`.
    ///
    /// With an explicit target, a policy rejection (nothing to snap,
    /// unresolved issues, pipeline failure) is the run's error. Without one,
    /// every changed component is a target and policy rejections are
    /// collected per component instead. Unless disabled, dependents of the
    /// snapped components are then re-snapped in dependency order.
    pub fn snap(&self, options: &WorkspaceSnapOptions) -> WorkspaceResult<SnapSummary> {
        options.snap.validate()?;
        let mut states = self.load_states()?;
        let depgraph = self.dependency_graph()?;
        if let Some(cycle) = depgraph.find_cycle() {
            return Err(weft_snap::SnapError::DependencyCycleDetected { cycle }.into());
        }

        let targets: Vec<String> = match &options.target {
            Some(name) => vec![self.manifest.component_id(name)?.full_name()],
            None => {
                // Integrity errors here abort the run; a skipped component
                // would silently hide store corruption.
                let mut changed = Vec::new();
                for state in states.values() {
                    let report = detect_changes(&self.graph, state)?;
                    if report.has_changes() || state.merging.is_some() {
                        changed.push(state.id.full_name());
                    }
                }
                changed
            }
        };
        if targets.is_empty() {
            return Err(WorkspaceError::NothingToSnap);
        }
        let sole_target = targets.len() == 1 && options.target.is_some();

        let builder = self.builder();
        let mut summary = SnapSummary::default();
        // Dependencies first, so a component's pins can name versions
        // recorded earlier in the same run.
        for name in topo_order(&depgraph, targets) {
            let deps: Vec<ComponentId> = depgraph.dependencies_of(&name).cloned().collect();
            let state = states
                .get_mut(&name)
                .ok_or_else(|| WorkspaceError::UnknownComponent(name.clone()))?;
            for dep in &deps {
                if let Some(head) = self.graph.head_of(dep, &self.lane)? {
                    state.pin_dependency(dep, head);
                }
            }
            match builder.snap(state, &options.snap) {
                Ok(receipt) => summary.snapped.push(receipt),
                Err(error) if error.is_component_policy() && !sole_target => {
                    summary.failures.push(SnapFailure {
                        component: state.id.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }

        if !options.skip_auto_snap && !summary.snapped.is_empty() {
            let result = propagate(
                &builder,
                &depgraph,
                &summary.snapped,
                &mut states,
                &options.snap,
            )?;
            summary.auto_snapped = result.snapped;
            summary.failures.extend(result.failures);
        }

        self.save_sync(&states)?;
        info!(
            snapped = summary.snapped.len(),
            auto = summary.auto_snapped.len(),
            failed = summary.failures.len(),
            "snap run finished"
        );
        Ok(summary)
    }

    /// Import components from a remote scope and update working copies on
    /// disk.
    pub fn import(
        &mut self,
        remote: &dyn RemoteScope,
        options: &ImportOptions,
    ) -> WorkspaceResult<ImportReport> {
        let importer = Importer::new(self.graph.clone(), self.lane.clone());
        let mut states = self.load_states()?;
        let report = importer.import(remote, &mut states, options)?;

        let mut manifest_changed = false;
        for entry in &report.components {
            let touched = matches!(
                entry.status,
                ImportStatus::Added | ImportStatus::FastForwarded | ImportStatus::Merged { .. }
            );
            if !touched {
                continue;
            }
            let id = entry.component.without_version();
            let name = id.path().to_string();
            if !self.manifest.components.contains_key(&name) {
                let scope = (id.scope() != self.manifest.scope).then(|| id.scope().to_string());
                self.manifest.add_component(
                    name.clone(),
                    ComponentEntry {
                        path: name.clone(),
                        dependencies: Vec::new(),
                        scope,
                    },
                );
                manifest_changed = true;
            }
            if let Some(state) = states.get(&id.full_name()) {
                let dir = self.manifest.component_dir(&self.root, &name)?;
                write_working_copy(&dir, &state.files)?;
            }
        }
        if manifest_changed {
            self.manifest.save(&self.root)?;
        }
        self.save_sync(&states)?;
        Ok(report)
    }

    /// Divergence of every tracked component, sorted by name.
    pub fn status(&self) -> WorkspaceResult<Vec<ComponentStatus>> {
        let states = self.load_states()?;
        let mut statuses = Vec::with_capacity(states.len());
        for state in states.values() {
            let report = detect_changes(&self.graph, state)?;
            let mut stale_pins = Vec::new();
            for pin in &state.dependencies {
                if let Some(head) = self.graph.head_of(&pin.component, &self.lane)? {
                    if head != pin.version {
                        stale_pins.push(pin.component.clone());
                    }
                }
            }
            let base_tree = match state.base {
                Some(base) => {
                    let version = self.graph.load_version(&base)?;
                    let obj = self.graph.store().read_required(&version.tree)?;
                    Some(FileTree::from_stored_object(&obj)?)
                }
                None => None,
            };
            statuses.push(ComponentStatus {
                id: state.id.clone(),
                head: self.graph.head_of(&state.id, &self.lane)?,
                new_component: report.new_component,
                files_changed: report.files_changed,
                dependencies_changed: report.dependencies_changed,
                changes: diff_trees(base_tree.as_ref(), &state.tree()?),
                stale_pins,
                merge_pending: state.merging.is_some(),
            });
        }
        Ok(statuses)
    }

    /// Full history of one component on the active lane, newest first.
    pub fn log(&self, name: &str) -> WorkspaceResult<Vec<(ObjectHash, VersionObject)>> {
        let id = self.manifest.component_id(name)?;
        let mut entries = Vec::new();
        for item in self.graph.history(&id, &self.lane)? {
            entries.push(item?);
        }
        Ok(entries)
    }

    /// Load every tracked component's working copy, with persisted sync
    /// points applied.
    pub fn load_states(&self) -> WorkspaceResult<BTreeMap<String, ComponentState>> {
        let sync = SyncState::load(&self.state_path())?;
        let mut states = BTreeMap::new();
        for name in self.manifest.components.keys() {
            let id = self.manifest.component_id(name)?;
            let dir = self.manifest.component_dir(&self.root, name)?;
            let mut state = if dir.exists() {
                ComponentState::from_dir(id.clone(), &dir)?
            } else {
                ComponentState::new(id.clone(), BTreeMap::new())
            };
            sync.apply_to(&mut state)?;
            states.insert(id.full_name(), state);
        }
        Ok(states)
    }

    fn builder(&self) -> SnapBuilder {
        SnapBuilder::new(
            self.graph.clone(),
            Arc::clone(&self.issues),
            Arc::clone(&self.pipeline),
            Author::new(
                self.manifest.author.name.clone(),
                self.manifest.author.email.clone(),
            ),
            self.lane.clone(),
        )
    }

    fn dependency_graph(&self) -> WorkspaceResult<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for (name, entry) in &self.manifest.components {
            let id = self.manifest.component_id(name)?;
            let deps = entry
                .dependencies
                .iter()
                .map(|dep| self.manifest.component_id(dep))
                .collect::<WorkspaceResult<Vec<_>>>()?;
            graph.add_component(&id, deps.iter());
        }
        Ok(graph)
    }

    fn state_path(&self) -> PathBuf {
        self.root.join(WEFT_DIR).join("state.json")
    }

    fn save_sync(&self, states: &BTreeMap<String, ComponentState>) -> WorkspaceResult<()> {
        let mut sync = SyncState::default();
        for state in states.values() {
            sync.record(state);
        }
        sync.save(&self.state_path())
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("scope", &self.manifest.scope)
            .finish_non_exhaustive()
    }
}

/// Order `targets` so that every target comes after the targets it depends
/// on. Assumes the graph is acyclic (checked by the caller).
fn topo_order(depgraph: &DependencyGraph, targets: Vec<String>) -> Vec<String> {
    let mut pending: std::collections::BTreeSet<String> = targets.into_iter().collect();
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let ready: Vec<String> = pending
            .iter()
            .filter(|name| {
                depgraph
                    .dependencies_of(name)
                    .all(|dep| !pending.contains(&dep.full_name()))
            })
            .cloned()
            .collect();
        for name in ready {
            pending.remove(&name);
            ordered.push(name);
        }
    }
    ordered
}

/// Replace a component directory's contents with `files`.
///
/// Stale tracked files are removed; hidden directories are left alone.
fn write_working_copy(dir: &Path, files: &BTreeMap<String, Vec<u8>>) -> WorkspaceResult<()> {
    fs::create_dir_all(dir)?;
    let existing = ComponentState::from_dir(ComponentId::new("tmp", "tmp")?, dir)?;
    for path in existing.files.keys() {
        if !files.contains_key(path) {
            fs::remove_file(dir.join(path))?;
        }
    }
    for (path, content) in files {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, content)?;
    }
    Ok(())
}
