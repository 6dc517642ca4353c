//! Persisted per-component sync state, `.weft/state.json`.
//!
//! The working copy itself lives in the component directories; this file
//! remembers what each working copy is synced to — the based-on version, a
//! pending merge head, and the current dependency pins. Like the lane head
//! table it is small, rewritten whole, and atomic on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use weft_snap::ComponentState;
use weft_store::DependencyPin;
use weft_types::{ComponentId, ObjectHash};

use crate::error::{WorkspaceError, WorkspaceResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PinRecord {
    component: String,
    version: String,
}

/// One component's persisted sync point.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SyncRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    merging: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<PinRecord>,
}

/// The whole state file, keyed by full component name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SyncState {
    components: BTreeMap<String, SyncRecord>,
}

impl SyncState {
    /// Load the state file, treating an absent file as empty.
    pub fn load(path: &Path) -> WorkspaceResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| WorkspaceError::MalformedFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the state file atomically.
    pub fn save(&self, path: &Path) -> WorkspaceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| WorkspaceError::MalformedFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| WorkspaceError::Io(e.error))?;
        Ok(())
    }

    /// Overlay the persisted sync point onto a freshly loaded working copy.
    pub fn apply_to(&self, state: &mut ComponentState) -> WorkspaceResult<()> {
        let Some(record) = self.components.get(&state.id.full_name()) else {
            return Ok(());
        };
        state.base = decode_opt(&record.base, "base")?;
        state.merging = decode_opt(&record.merging, "merging")?;
        state.dependencies = record
            .dependencies
            .iter()
            .map(|pin| {
                let component: ComponentId = pin.component.parse().map_err(|_| malformed(&pin.component))?;
                let version = ObjectHash::from_hex(&pin.version).map_err(|_| malformed(&pin.version))?;
                Ok(DependencyPin::new(component, version))
            })
            .collect::<WorkspaceResult<Vec<_>>>()?;
        state.dependencies.sort();
        Ok(())
    }

    /// Record a component's current sync point.
    pub fn record(&mut self, state: &ComponentState) {
        self.components.insert(
            state.id.full_name(),
            SyncRecord {
                base: state.base.map(|h| h.to_hex()),
                merging: state.merging.map(|h| h.to_hex()),
                dependencies: state
                    .dependencies
                    .iter()
                    .map(|pin| PinRecord {
                        component: pin.component.full_name(),
                        version: pin.version.to_hex(),
                    })
                    .collect(),
            },
        );
    }
}

fn decode_opt(value: &Option<String>, field: &str) -> WorkspaceResult<Option<ObjectHash>> {
    match value {
        Some(hex) => ObjectHash::from_hex(hex)
            .map(Some)
            .map_err(|_| malformed(&format!("{field}: {hex}"))),
        None => Ok(None),
    }
}

fn malformed(detail: &str) -> WorkspaceError {
    WorkspaceError::MalformedFile {
        path: PathBuf::from("state.json"),
        reason: format!("bad value '{detail}'"),
    }
}
