use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tasktrack_core::{TrackerError, TrackerResult};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{InstanceId, KeyValueStore, StorageEvent, StorageEventKind};

pub const FORMAT_VERSION: u32 = 1;
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Handle that wrote the file last
    pub instance_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

/// On-disk layout: the whole namespace plus who wrote it.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: StoreMetadata,
    pub data: BTreeMap<String, String>,
}

/// Key/value store persisted as one JSON file.
///
/// Reads see the file as it is now. Every write re-reads the file, applies
/// its one key and rewrites the file atomically, so concurrent writers only
/// race on the same key. Changes found on disk are announced as storage
/// events; [`JsonFileStore::reload`] triggers that without a read, usually
/// driven by a [`FileWatcher`](crate::FileWatcher).
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: InstanceId,
    entries: RwLock<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

fn read_envelope(path: &Path) -> TrackerResult<Option<JsonEnvelope>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = AtomicWriter::read_all(path)?;
    let envelope: JsonEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
        TrackerError::Serialization(format!("{} is not a storage file: {}", path.display(), e))
    })?;
    if envelope.version != FORMAT_VERSION {
        return Err(TrackerError::Serialization(format!(
            "Unsupported format version: {}",
            envelope.version
        )));
    }
    Ok(Some(envelope))
}

impl JsonFileStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> TrackerResult<Self> {
        Self::open_with_instance_id(path, Uuid::new_v4())
    }

    /// Open with a specific instance ID
    /// (useful for testing or coordinating across instances)
    pub fn open_with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> TrackerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = read_envelope(&path)?
            .map(|envelope| envelope.data)
            .unwrap_or_default();
        tracing::info!("Opened {} with {} keys", path.display(), entries.len());

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(Self {
            path,
            instance_id,
            entries: RwLock::new(entries),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> TrackerResult<()> {
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: StoreMetadata {
                instance_id: self.instance_id,
                saved_at: Utc::now(),
            },
            data: entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&self.path, &bytes)
    }

    fn notify(&self, key: &str, kind: StorageEventKind, origin: Option<InstanceId>) {
        let _ = self.events.send(StorageEvent::new(key, kind, origin));
    }

    fn read_disk(&self) -> TrackerResult<(Option<InstanceId>, BTreeMap<String, String>)> {
        Ok(match read_envelope(&self.path)? {
            Some(envelope) => (Some(envelope.metadata.instance_id), envelope.data),
            None => (None, BTreeMap::new()),
        })
    }

    fn announce(&self, changes: &[(String, StorageEventKind)], origin: Option<InstanceId>) {
        for (key, kind) in changes {
            self.notify(key, *kind, origin);
        }
    }

    /// Re-reads the file and announces every key that differs from memory,
    /// attributed to the file's last writer. Returns the number of changed keys.
    pub fn reload(&self) -> TrackerResult<usize> {
        let (origin, fresh) = self.read_disk()?;
        let changes = {
            let mut entries = self.entries.write();
            let changes = diff(&entries, &fresh);
            *entries = fresh;
            changes
        };

        if !changes.is_empty() {
            tracing::info!(
                "Reloaded {}: {} keys changed externally",
                self.path.display(),
                changes.len()
            );
        }
        self.announce(&changes, origin);
        Ok(changes.len())
    }

    /// Applies one key change to the file's current content and writes it
    /// back, so keys written by other handles since the last read survive.
    /// Memory adopts the written map; external changes picked up on the way
    /// are announced like a reload.
    fn write_through(&self, key: &str, value: Option<&str>) -> TrackerResult<bool> {
        let (origin, external) = {
            let mut entries = self.entries.write();
            let (origin, mut fresh) = self.read_disk()?;
            let mut external = diff(&entries, &fresh);
            external.retain(|(changed, _)| changed != key);

            let changed = match value {
                Some(value) => {
                    fresh.insert(key.to_string(), value.to_string());
                    true
                }
                None => fresh.remove(key).is_some() || entries.contains_key(key),
            };
            if !changed {
                return Ok(false);
            }
            self.persist(&fresh)?;
            *entries = fresh;
            (origin, external)
        };

        if !external.is_empty() {
            tracing::debug!(
                "Merged {} external changes into write of {}",
                external.len(),
                key
            );
        }
        self.announce(&external, origin);
        Ok(true)
    }
}

/// Keys whose value differs between `old` and `new`.
fn diff(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<(String, StorageEventKind)> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (previous, Some(current)) if previous != Some(current) => {
                Some((key.clone(), StorageEventKind::Set))
            }
            (Some(_), None) => Some((key.clone(), StorageEventKind::Removed)),
            _ => None,
        })
        .collect()
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        self.reload()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        self.write_through(key, Some(value))?;
        self.notify(key, StorageEventKind::Set, Some(self.instance_id));
        Ok(())
    }

    fn remove(&self, key: &str) -> TrackerResult<()> {
        if self.write_through(key, None)? {
            self.notify(key, StorageEventKind::Removed, Some(self.instance_id));
        }
        Ok(())
    }

    fn keys(&self) -> TrackerResult<Vec<String>> {
        self.reload()?;
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_reopen() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");

        let store = JsonFileStore::open(&file_path).unwrap();
        store.set("taskManager_projects", "[]").unwrap();
        assert!(file_path.exists());

        let reopened = JsonFileStore::open(&file_path).unwrap();
        assert_eq!(
            reopened.get("taskManager_projects").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_envelope_layout() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        let id = Uuid::new_v4();

        let store = JsonFileStore::open_with_instance_id(&file_path, id).unwrap();
        store.set("k", "v").unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&file_path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["metadata"]["instance_id"], id.to_string());
        assert_eq!(raw["data"]["k"], "v");
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        std::fs::write(&file_path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&file_path),
            Err(TrackerError::Serialization(_))
        ));
    }

    #[test]
    fn test_reload_reports_external_changes() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");

        let ours = JsonFileStore::open(&file_path).unwrap();
        ours.set("a", "1").unwrap();
        ours.set("b", "2").unwrap();
        let mut rx = ours.subscribe();

        let theirs = JsonFileStore::open(&file_path).unwrap();
        theirs.set("a", "changed").unwrap();
        theirs.remove("b").unwrap();

        assert_eq!(ours.reload().unwrap(), 2);
        assert_eq!(ours.get("a").unwrap().as_deref(), Some("changed"));
        assert_eq!(ours.get("b").unwrap(), None);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.key, "a");
        assert_eq!(first.origin, Some(theirs.instance_id()));
        assert_eq!(rx.try_recv().unwrap().kind, StorageEventKind::Removed);

        // Nothing new on disk, nothing to announce.
        assert_eq!(ours.reload().unwrap(), 0);
    }

    #[test]
    fn test_stale_handle_keeps_keys_written_by_others() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");

        let a = JsonFileStore::open(&file_path).unwrap();
        let b = JsonFileStore::open(&file_path).unwrap();
        let mut rx = a.subscribe();

        b.set("taskManager_project_b", "{}").unwrap();
        a.set("taskManager_project_a", "{}").unwrap();

        let reopened = JsonFileStore::open(&file_path).unwrap();
        assert_eq!(
            reopened.keys().unwrap(),
            vec!["taskManager_project_a", "taskManager_project_b"]
        );

        // The merged key is announced as b's write, then a's own write follows.
        let merged = rx.try_recv().unwrap();
        assert_eq!(merged.key, "taskManager_project_b");
        assert_eq!(merged.origin, Some(b.instance_id()));
        assert_eq!(rx.try_recv().unwrap().origin, Some(a.instance_id()));
        assert_eq!(a.get("taskManager_project_b").unwrap().as_deref(), Some("{}"));

        b.remove("taskManager_project_a").unwrap();
        a.set("taskManager_project_c", "{}").unwrap();
        let reopened = JsonFileStore::open(&file_path).unwrap();
        assert_eq!(
            reopened.keys().unwrap(),
            vec!["taskManager_project_b", "taskManager_project_c"]
        );
    }

    #[test]
    fn test_removing_missing_key_writes_nothing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");
        let store = JsonFileStore::open(&file_path).unwrap();
        store.remove("absent").unwrap();
        assert!(!file_path.exists());
    }

    #[test]
    fn test_failed_write_keeps_memory_consistent() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let file_path = dir.path().join("store.json");
        std::fs::create_dir(&file_path).unwrap();

        let store = JsonFileStore {
            path: file_path,
            instance_id: Uuid::new_v4(),
            entries: RwLock::new(BTreeMap::new()),
            events: broadcast::channel(4).0,
        };
        assert!(store.set("k", "v").is_err());
        assert!(store.entries.read().is_empty());
    }
}
