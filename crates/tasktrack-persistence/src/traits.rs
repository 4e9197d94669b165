use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tasktrack_core::TrackerResult;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identifies one open handle on a store (one "view" of the data).
pub type InstanceId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEventKind {
    Set,
    Removed,
}

/// Emitted for every key a store writes or removes.
#[derive(Debug, Clone)]
pub struct StorageEvent {
    pub key: String,
    pub kind: StorageEventKind,
    /// The handle that made the change; `None` when it cannot be told.
    pub origin: Option<InstanceId>,
    pub at: DateTime<Utc>,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>, kind: StorageEventKind, origin: Option<InstanceId>) -> Self {
        Self {
            key: key.into(),
            kind,
            origin,
            at: Utc::now(),
        }
    }
}

/// String key/value storage port.
///
/// Writes replace whole values. Every successful `set` or `remove` is
/// broadcast to subscribers of every handle on the same underlying data.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> TrackerResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> TrackerResult<()>;

    fn remove(&self, key: &str) -> TrackerResult<()>;

    fn keys(&self) -> TrackerResult<Vec<String>>;

    /// The identity this handle stamps on its own change events.
    fn instance_id(&self) -> InstanceId;

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// Trait for detecting changes to the storage file
/// Used for multi-process coordination
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Start watching the file for changes
    async fn start_watching(&self, path: PathBuf) -> TrackerResult<()>;

    /// Stop watching the file
    async fn stop_watching(&self) -> TrackerResult<()>;

    /// Subscribe to change events
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;

    fn is_watching(&self) -> bool;
}

/// Event indicating a change to the watched file
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Path to the file that changed
    pub path: PathBuf,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}
