//! The workspace manifest, `weft.json`.
//!
//! The manifest is the human-edited file at the workspace root declaring the
//! scope, the author identity, and which directories are tracked components.
//! Component entries are keyed by the name within the scope (`ui/button`);
//! the full component id is `<scope>/<name>`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use weft_types::ComponentId;

use crate::error::{WorkspaceError, WorkspaceResult};

/// Manifest file name at the workspace root.
pub const MANIFEST_FILE: &str = "weft.json";

/// Author identity recorded on versions created from this workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "unknown".into(),
            email: "unknown@localhost".into(),
        }
    }
}

/// One tracked component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Directory of the component's sources, relative to the workspace root.
    pub path: String,
    /// Names of other workspace components this one depends on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Owning scope, when the component was imported from elsewhere.
    /// Absent for components native to this workspace's scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// The parsed `weft.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    /// The scope this workspace publishes under.
    pub scope: String,
    #[serde(default)]
    pub author: AuthorConfig,
    /// Tracked components by name within the scope.
    #[serde(default)]
    pub components: BTreeMap<String, ComponentEntry>,
}

impl WorkspaceManifest {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            author: AuthorConfig::default(),
            components: BTreeMap::new(),
        }
    }

    /// Load the manifest from `root/weft.json`.
    pub fn load(root: &Path) -> WorkspaceResult<Self> {
        let path = root.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(WorkspaceError::ManifestNotFound(root.to_path_buf()));
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| WorkspaceError::MalformedFile {
            path,
            reason: e.to_string(),
        })
    }

    /// Write the manifest to `root/weft.json` atomically.
    pub fn save(&self, root: &Path) -> WorkspaceResult<()> {
        let path = root.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| WorkspaceError::MalformedFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let mut tmp = NamedTempFile::new_in(root)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| WorkspaceError::Io(e.error))?;
        Ok(())
    }

    /// The full component id for a tracked name.
    pub fn component_id(&self, name: &str) -> WorkspaceResult<ComponentId> {
        let entry = self
            .components
            .get(name)
            .ok_or_else(|| WorkspaceError::UnknownComponent(name.to_string()))?;
        let scope = entry.scope.as_deref().unwrap_or(&self.scope);
        Ok(ComponentId::new(scope, name)?)
    }

    /// The source directory of a tracked component.
    pub fn component_dir(&self, root: &Path, name: &str) -> WorkspaceResult<PathBuf> {
        let entry = self
            .components
            .get(name)
            .ok_or_else(|| WorkspaceError::UnknownComponent(name.to_string()))?;
        Ok(root.join(&entry.path))
    }

    /// Track a component. Overwrites any existing entry of the same name.
    pub fn add_component(&mut self, name: impl Into<String>, entry: ComponentEntry) {
        self.components.insert(name.into(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = WorkspaceManifest::new("acme.design");
        manifest.add_component(
            "ui/button",
            ComponentEntry {
                path: "components/button".into(),
                dependencies: vec!["ui/theme".into()],
                scope: None,
            },
        );
        manifest.save(dir.path()).unwrap();

        let loaded = WorkspaceManifest::load(dir.path()).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkspaceManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::ManifestNotFound(_)));
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), b"{ nope").unwrap();
        let err = WorkspaceManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::MalformedFile { .. }));
    }

    #[test]
    fn component_id_joins_scope_and_name() {
        let mut manifest = WorkspaceManifest::new("acme");
        manifest.add_component("ui/button", ComponentEntry::default());
        let id = manifest.component_id("ui/button").unwrap();
        assert_eq!(id.full_name(), "acme/ui/button");
        assert!(manifest.component_id("ui/ghost").is_err());
    }

    #[test]
    fn minimal_manifest_parses() {
        let json = r#"{ "scope": "acme" }"#;
        let manifest: WorkspaceManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.scope, "acme");
        assert!(manifest.components.is_empty());
    }
}
