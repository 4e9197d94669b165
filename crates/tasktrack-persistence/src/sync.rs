//! Turning other views' writes into reload requests.
//!
//! There is no merging: whoever wrote last wins, and a view that hears about
//! a change simply re-reads what it shows.

use tasktrack_domain::ProjectId;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::keys::KeyKind;
use crate::traits::{InstanceId, KeyValueStore, StorageEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    AppState,
    Projects,
    ProjectData(ProjectId),
    /// Events were missed; re-read everything.
    All,
}

impl ReloadEvent {
    pub fn from_key(key: &str) -> Option<Self> {
        KeyKind::parse(key).map(|kind| match kind {
            KeyKind::AppState => Self::AppState,
            KeyKind::Projects => Self::Projects,
            KeyKind::ProjectData(id) => Self::ProjectData(id),
        })
    }
}

/// Listens to one store and yields reloads for changes made by other handles.
pub struct ReloadListener {
    rx: broadcast::Receiver<StorageEvent>,
    own_id: InstanceId,
}

impl ReloadListener {
    pub fn new(store: &dyn KeyValueStore) -> Self {
        Self {
            rx: store.subscribe(),
            own_id: store.instance_id(),
        }
    }

    fn translate(&self, event: StorageEvent) -> Option<ReloadEvent> {
        if event.origin == Some(self.own_id) {
            return None;
        }
        ReloadEvent::from_key(&event.key)
    }

    /// Next pending reload, without waiting.
    pub fn try_next(&mut self) -> Option<ReloadEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(reload) = self.translate(event) {
                        return Some(reload);
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} storage events, reloading everything", skipped);
                    return Some(ReloadEvent::All);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// All pending reloads, de-duplicated, in arrival order.
    pub fn drain(&mut self) -> Vec<ReloadEvent> {
        let mut pending: Vec<ReloadEvent> = Vec::new();
        while let Some(reload) = self.try_next() {
            if !pending.contains(&reload) {
                pending.push(reload);
            }
        }
        pending
    }

    /// Waits for the next reload; `None` once the store is gone.
    pub async fn next(&mut self) -> Option<ReloadEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if let Some(reload) = self.translate(event) {
                        return Some(reload);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} storage events, reloading everything", skipped);
                    return Some(ReloadEvent::All);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{project_data_key, APP_STATE_KEY, PROJECTS_KEY};
    use crate::store::MemoryStore;

    #[test]
    fn test_from_key() {
        assert_eq!(ReloadEvent::from_key(APP_STATE_KEY), Some(ReloadEvent::AppState));
        assert_eq!(ReloadEvent::from_key(PROJECTS_KEY), Some(ReloadEvent::Projects));
        assert_eq!(
            ReloadEvent::from_key(&project_data_key("p1")),
            Some(ReloadEvent::ProjectData("p1".into()))
        );
        assert_eq!(ReloadEvent::from_key("unrelated"), None);
    }

    #[test]
    fn test_own_writes_are_not_reloads() {
        let mine = MemoryStore::new();
        let other = mine.open_view();
        let mut listener = ReloadListener::new(&mine);

        mine.set(PROJECTS_KEY, "[]").unwrap();
        assert_eq!(listener.try_next(), None);

        other.set(PROJECTS_KEY, "[]").unwrap();
        other.set(&project_data_key("p1"), "{}").unwrap();
        other.set(PROJECTS_KEY, "[]").unwrap();
        other.set("someone_else", "x").unwrap();
        assert_eq!(
            listener.drain(),
            vec![ReloadEvent::Projects, ReloadEvent::ProjectData("p1".into())]
        );
    }

    #[test]
    fn test_lag_requests_full_reload() {
        let mine = MemoryStore::new();
        let other = mine.open_view();
        let mut listener = ReloadListener::new(&mine);

        for i in 0..200 {
            other.set(APP_STATE_KEY, &i.to_string()).unwrap();
        }
        assert_eq!(listener.try_next(), Some(ReloadEvent::All));
    }

    #[tokio::test]
    async fn test_next_waits_for_other_views() {
        let mine = MemoryStore::new();
        let other = mine.open_view();
        let mut listener = ReloadListener::new(&mine);

        let writer = tokio::spawn(async move {
            other.set(APP_STATE_KEY, "{}").unwrap();
        });
        let reload = tokio::time::timeout(std::time::Duration::from_secs(2), listener.next())
            .await
            .unwrap();
        writer.await.unwrap();
        assert_eq!(reload, Some(ReloadEvent::AppState));
    }
}
