use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tasktrack_core::{TrackerError, TrackerResult};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::traits::{InstanceId, KeyValueStore, StorageEvent, StorageEventKind};

const EVENT_BUFFER: usize = 64;

struct Shared {
    entries: RwLock<BTreeMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    quota: Option<usize>,
}

/// In-memory key/value store.
///
/// Handles made with [`MemoryStore::open_view`] share one namespace, the way
/// several open windows share the same local storage, and each sees the
/// others' writes as change events.
pub struct MemoryStore {
    shared: Arc<Shared>,
    instance_id: InstanceId,
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A store that refuses writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(BTreeMap::new()),
                events,
                quota,
            }),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Another handle on the same data, with its own identity.
    pub fn open_view(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.shared
            .entries
            .read()
            .iter()
            .map(|(k, v)| entry_size(k, v))
            .sum()
    }

    fn notify(&self, key: &str, kind: StorageEventKind) {
        // No subscribers is fine.
        let _ = self
            .shared
            .events
            .send(StorageEvent::new(key, kind, Some(self.instance_id)));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        Ok(self.shared.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        {
            let mut entries = self.shared.entries.write();
            if let Some(quota) = self.shared.quota {
                let used: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| entry_size(k, v))
                    .sum();
                let requested = entry_size(key, value);
                let available = quota.saturating_sub(used);
                if requested > available {
                    return Err(TrackerError::QuotaExceeded {
                        key: key.to_string(),
                        requested,
                        available,
                    });
                }
            }
            entries.insert(key.to_string(), value.to_string());
        }
        self.notify(key, StorageEventKind::Set);
        Ok(())
    }

    fn remove(&self, key: &str) -> TrackerResult<()> {
        let removed = self.shared.entries.write().remove(key).is_some();
        if removed {
            self.notify(key, StorageEventKind::Removed);
        }
        Ok(())
    }

    fn keys(&self) -> TrackerResult<Vec<String>> {
        Ok(self.shared.entries.read().keys().cloned().collect())
    }

    fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.shared.events.subscribe()
    }
}
