use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;
use weft_types::{ComponentId, Lane, ObjectHash};

use crate::error::{GraphError, GraphResult};
use crate::traits::LaneStore;

type HeadTable = BTreeMap<String, BTreeMap<String, ObjectHash>>;
type HexTable = BTreeMap<String, BTreeMap<String, String>>;

/// File-backed lane head table.
///
/// The whole table is one JSON file mapping `component -> lane -> head hex`,
/// loaded on open and rewritten atomically (temp file + rename) on every
/// successful swap. The table is small — one entry per `(component, lane)` —
/// so whole-file rewrites are cheap and keep crash states trivially
/// consistent: the file always holds a complete table.
pub struct FsLaneStore {
    path: PathBuf,
    table: Mutex<HeadTable>,
}

impl FsLaneStore {
    /// Open the head table at `path`, creating an empty one if absent.
    pub fn open(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let table = if path.exists() {
            let bytes = fs::read(&path)?;
            let hex: HexTable = serde_json::from_slice(&bytes)
                .map_err(|e| GraphError::CorruptHeadTable(e.to_string()))?;
            decode_table(hex)?
        } else {
            HeadTable::new()
        };
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    fn persist(&self, table: &HeadTable) -> GraphResult<()> {
        let hex: HexTable = table
            .iter()
            .map(|(component, lanes)| {
                let lanes = lanes
                    .iter()
                    .map(|(lane, head)| (lane.clone(), head.to_hex()))
                    .collect();
                (component.clone(), lanes)
            })
            .collect();
        let bytes = serde_json::to_vec_pretty(&hex)
            .map_err(|e| GraphError::CorruptHeadTable(e.to_string()))?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| GraphError::Io(e.error))?;
        Ok(())
    }
}

fn decode_table(hex: HexTable) -> GraphResult<HeadTable> {
    let mut table = HeadTable::new();
    for (component, lanes) in hex {
        let mut decoded = BTreeMap::new();
        for (lane, head) in lanes {
            let head = ObjectHash::from_hex(&head)
                .map_err(|e| GraphError::CorruptHeadTable(e.to_string()))?;
            decoded.insert(lane, head);
        }
        table.insert(component, decoded);
    }
    Ok(table)
}

impl LaneStore for FsLaneStore {
    fn head(&self, component: &ComponentId, lane: &Lane) -> GraphResult<Option<ObjectHash>> {
        let table = self.table.lock().expect("lock poisoned");
        Ok(table
            .get(&component.full_name())
            .and_then(|lanes| lanes.get(lane.name()))
            .copied())
    }

    fn compare_and_swap(
        &self,
        component: &ComponentId,
        lane: &Lane,
        expected: Option<ObjectHash>,
        new: ObjectHash,
    ) -> GraphResult<()> {
        let mut table = self.table.lock().expect("lock poisoned");
        let actual = table
            .get(&component.full_name())
            .and_then(|lanes| lanes.get(lane.name()))
            .copied();
        if actual != expected {
            return Err(GraphError::NonLinearUpdate {
                component: component.without_version(),
                lane: lane.clone(),
                expected,
                actual,
            });
        }
        // Persist first so an I/O failure leaves the in-memory view unchanged.
        let mut next = table.clone();
        next.entry(component.full_name())
            .or_default()
            .insert(lane.name().to_string(), new);
        self.persist(&next)?;
        *table = next;
        debug!(component = %component.full_name(), lane = %lane, head = %new.short_hex(), "advanced lane head");
        Ok(())
    }

    fn lanes_of(&self, component: &ComponentId) -> GraphResult<Vec<Lane>> {
        let table = self.table.lock().expect("lock poisoned");
        Ok(table
            .get(&component.full_name())
            .map(|lanes| {
                lanes
                    .keys()
                    .filter_map(|name| Lane::new(name.clone()).ok())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn components(&self) -> GraphResult<Vec<ComponentId>> {
        let table = self.table.lock().expect("lock poisoned");
        Ok(table.keys().filter_map(|name| name.parse().ok()).collect())
    }
}

impl std::fmt::Debug for FsLaneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsLaneStore").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(s: &str) -> ComponentId {
        s.parse().unwrap()
    }

    fn oh(b: u8) -> ObjectHash {
        ObjectHash::from_raw([b; 20])
    }

    #[test]
    fn open_without_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLaneStore::open(dir.path().join("heads.json")).unwrap();
        assert!(store.head(&cid("acme/button"), &Lane::trunk()).unwrap().is_none());
    }

    #[test]
    fn heads_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heads.json");
        {
            let store = FsLaneStore::open(&path).unwrap();
            store
                .compare_and_swap(&cid("acme/button"), &Lane::trunk(), None, oh(1))
                .unwrap();
        }
        let reopened = FsLaneStore::open(&path).unwrap();
        assert_eq!(
            reopened.head(&cid("acme/button"), &Lane::trunk()).unwrap(),
            Some(oh(1))
        );
    }

    #[test]
    fn cas_rejects_stale_expectation_and_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heads.json");
        let store = FsLaneStore::open(&path).unwrap();
        let id = cid("acme/button");
        store.compare_and_swap(&id, &Lane::trunk(), None, oh(1)).unwrap();

        let err = store
            .compare_and_swap(&id, &Lane::trunk(), None, oh(2))
            .unwrap_err();
        assert!(matches!(err, GraphError::NonLinearUpdate { .. }));

        let reopened = FsLaneStore::open(&path).unwrap();
        assert_eq!(reopened.head(&id, &Lane::trunk()).unwrap(), Some(oh(1)));
    }

    #[test]
    fn corrupt_table_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heads.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = FsLaneStore::open(&path).unwrap_err();
        assert!(matches!(err, GraphError::CorruptHeadTable(_)));
    }

    #[test]
    fn multiple_components_and_lanes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLaneStore::open(dir.path().join("heads.json")).unwrap();
        let feature = Lane::new("feature/x").unwrap();
        store
            .compare_and_swap(&cid("acme/button"), &Lane::trunk(), None, oh(1))
            .unwrap();
        store
            .compare_and_swap(&cid("acme/button"), &feature, None, oh(2))
            .unwrap();
        store
            .compare_and_swap(&cid("acme/card"), &Lane::trunk(), None, oh(3))
            .unwrap();

        assert_eq!(store.components().unwrap().len(), 2);
        assert_eq!(store.lanes_of(&cid("acme/button")).unwrap().len(), 2);
    }
}
