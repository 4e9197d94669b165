use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;

use tasktrack_core::{AppConfig, Paginator, TrackerError, TrackerResult};
use tasktrack_domain::{Project, Task, TrackerOperations};
use tasktrack_persistence::{JsonFileStore, StorageService, TaskManager};

/// One CLI invocation's session over the storage file.
///
/// Dereferences to the [`TaskManager`], so handlers call tracker operations
/// on the context directly.
pub struct CliContext {
    manager: TaskManager,
    store: Arc<JsonFileStore>,
}

impl CliContext {
    pub fn load(file_path: &Path, config: &AppConfig) -> TrackerResult<Self> {
        let store = Arc::new(JsonFileStore::open(file_path)?);
        let storage = StorageService::new(store.clone());
        let paginator = Paginator::new(config.effective_items_per_page());
        Ok(Self {
            manager: TaskManager::with_paginator(storage, paginator),
            store,
        })
    }

    pub fn store(&self) -> &Arc<JsonFileStore> {
        &self.store
    }

    /// Finds a project by id, then by case-insensitive name.
    pub fn resolve_project(&self, id_or_name: &str) -> TrackerResult<Project> {
        let projects = self.manager.list_projects();
        let wanted = id_or_name.trim();
        projects
            .iter()
            .find(|p| p.id == wanted)
            .or_else(|| {
                projects
                    .iter()
                    .find(|p| p.name.to_lowercase() == wanted.to_lowercase())
            })
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("Project not found: {}", id_or_name)))
    }

    pub fn require_current(&self) -> TrackerResult<Project> {
        self.manager
            .current_project()
            .ok_or_else(|| TrackerError::NotFound("No project selected".into()))
    }

    /// Filtered tasks of the current project, ignoring pagination.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.manager.project_data().visible_tasks()
    }
}

impl Deref for CliContext {
    type Target = TaskManager;

    fn deref(&self) -> &Self::Target {
        &self.manager
    }
}

impl DerefMut for CliContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.manager
    }
}
