use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tasktrack_core::{TrackerError, TrackerResult};
use tasktrack_domain::export::{BackupExport, BackupProject, ProjectExport};
use tasktrack_domain::{
    pick_color, AppState, ImportBatch, Project, ProjectData, ProjectUpdate, Task,
};

use crate::keys::{is_tracker_key, project_data_key, APP_STATE_KEY, PROJECTS_KEY};
use crate::traits::KeyValueStore;

/// Typed access to the tracker's records in a key/value store.
///
/// Reads never fail: a missing or unreadable record is logged and replaced by
/// its empty value. Writes log failures and hand them back to the caller.
#[derive(Clone)]
pub struct StorageService {
    store: Arc<dyn KeyValueStore>,
}

impl StorageService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!("Read {} ({} bytes)", key, raw.len());
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> TrackerResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        match self.store.set(key, &json) {
            Ok(()) => {
                tracing::debug!("Wrote {} ({} bytes)", key, json.len());
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to write {}: {}", key, e);
                Err(e)
            }
        }
    }

    fn remove_key(&self, key: &str) -> TrackerResult<()> {
        self.store.remove(key).inspect_err(|e| {
            tracing::error!("Failed to remove {}: {}", key, e);
        })
    }

    // App state

    /// The stored app state with the project list taken from the projects
    /// record, which is authoritative. The current project falls back to the
    /// first project when unset or stale.
    pub fn get_app_state(&self) -> AppState {
        let projects = self.get_projects();
        let mut state = self.read_json::<AppState>(APP_STATE_KEY).unwrap_or_default();
        state.projects = projects;
        state.ensure_current();
        state
    }

    pub fn save_app_state(&self, state: &AppState) -> TrackerResult<()> {
        self.write_json(APP_STATE_KEY, state)
    }

    // Projects

    pub fn get_projects(&self) -> Vec<Project> {
        self.read_json(PROJECTS_KEY).unwrap_or_default()
    }

    pub fn save_projects(&self, projects: &[Project]) -> TrackerResult<()> {
        self.write_json(PROJECTS_KEY, projects)
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.get_projects().into_iter().find(|p| p.id == id)
    }

    /// Creates a project with the next free palette color and empty data.
    /// Name rules and the project limit are the caller's business.
    pub fn create_project(&self, name: &str, description: Option<&str>) -> TrackerResult<Project> {
        let mut projects = self.get_projects();
        let project = Project::new(name, description, pick_color(&projects));
        projects.push(project.clone());
        self.save_projects(&projects)?;
        self.save_project_data(&project.id, &ProjectData::default())?;
        tracing::info!("Created project {} ({})", project.name, project.id);
        Ok(project)
    }

    pub fn update_project(&self, id: &str, update: ProjectUpdate) -> TrackerResult<Project> {
        let mut projects = self.get_projects();
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("Project {}", id)))?;
        project.apply_update(update);
        let updated = project.clone();
        self.save_projects(&projects)?;
        Ok(updated)
    }

    /// Removes a project and its data. When it was the current project, the
    /// first remaining one (or none) becomes current. Returns whether the
    /// project existed.
    pub fn delete_project(&self, id: &str) -> TrackerResult<bool> {
        let mut projects = self.get_projects();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Ok(false);
        }

        self.remove_key(&project_data_key(id))?;
        self.save_projects(&projects)?;

        // The stale current id falls back to the first remaining project.
        let state = self.get_app_state();
        self.save_app_state(&state)?;
        tracing::info!("Deleted project {}", id);
        Ok(true)
    }

    // Project data

    pub fn get_project_data(&self, project_id: &str) -> ProjectData {
        self.read_json(&project_data_key(project_id))
            .unwrap_or_default()
    }

    /// Writes the whole record, then refreshes the project's cached counters.
    pub fn save_project_data(&self, project_id: &str, data: &ProjectData) -> TrackerResult<()> {
        self.write_json(&project_data_key(project_id), data)?;
        self.update_project_metadata(project_id, &data.tasks)
    }

    pub fn update_project_metadata(&self, project_id: &str, tasks: &[Task]) -> TrackerResult<()> {
        let mut projects = self.get_projects();
        match projects.iter_mut().find(|p| p.id == project_id) {
            Some(project) => {
                project.update_counts(tasks);
                self.save_projects(&projects)
            }
            None => {
                tracing::debug!("No project {} to update counters for", project_id);
                Ok(())
            }
        }
    }

    // Tasks

    pub fn add_task(&self, project_id: &str, task: Task) -> TrackerResult<Task> {
        let mut data = self.get_project_data(project_id);
        data.add_task(task.clone());
        self.save_project_data(project_id, &data)?;
        Ok(task)
    }

    pub fn update_task<F>(&self, project_id: &str, task_id: &str, update: F) -> TrackerResult<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut data = self.get_project_data(project_id);
        let task = data
            .task_mut(task_id)
            .ok_or_else(|| TrackerError::NotFound(format!("Task {}", task_id)))?;
        update(task);
        let updated = task.clone();
        self.save_project_data(project_id, &data)?;
        Ok(updated)
    }

    pub fn delete_task(&self, project_id: &str, task_id: &str) -> TrackerResult<bool> {
        let mut data = self.get_project_data(project_id);
        if !data.delete_task(task_id) {
            return Ok(false);
        }
        self.save_project_data(project_id, &data)?;
        Ok(true)
    }

    /// Prepends an imported batch to the project. Returns the number of tasks added.
    pub fn import_tasks(&self, project_id: &str, batch: ImportBatch) -> TrackerResult<usize> {
        let count = batch.tasks.len();
        let mut data = self.get_project_data(project_id);
        data.merge_import(project_id, batch);
        self.save_project_data(project_id, &data)?;
        tracing::info!("Imported {} tasks into project {}", count, project_id);
        Ok(count)
    }

    // Whole-namespace operations

    pub fn export_project_data(&self, project_id: &str) -> Option<ProjectExport> {
        let project = self.get_project(project_id)?;
        Some(ProjectExport {
            data: self.get_project_data(project_id),
            project,
        })
    }

    /// Bytes held under the tracker's keys, keys included.
    pub fn total_storage_size(&self) -> usize {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Failed to list keys: {}", e);
                return 0;
            }
        };
        keys.iter()
            .filter(|key| is_tracker_key(key))
            .filter_map(|key| match self.store.get(key) {
                Ok(value) => value.map(|v| key.len() + v.len()),
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", key, e);
                    None
                }
            })
            .sum()
    }

    /// Removes every tracker key; anything else in the store is left alone.
    pub fn clear_all_data(&self) -> TrackerResult<()> {
        let keys = self.store.keys()?;
        let mut removed = 0;
        for key in keys.iter().filter(|key| is_tracker_key(key)) {
            self.remove_key(key)?;
            removed += 1;
        }
        tracing::info!("Cleared {} keys", removed);
        Ok(())
    }

    pub fn export_backup(&self) -> BackupExport {
        let state = self.get_app_state();
        let projects = state
            .projects
            .iter()
            .map(|project| BackupProject {
                data: Some(self.get_project_data(&project.id)),
                project: project.clone(),
            })
            .collect();
        BackupExport::new(state, projects)
    }

    /// Replaces everything with the backup's content.
    pub fn import_backup(&self, backup: &BackupExport) -> TrackerResult<()> {
        self.clear_all_data()?;

        if let Some(state) = &backup.app_state {
            self.save_app_state(state)?;
        }
        let projects: Vec<Project> = backup.projects.iter().map(|p| p.project.clone()).collect();
        self.save_projects(&projects)?;
        for entry in &backup.projects {
            if let Some(data) = &entry.data {
                self.save_project_data(&entry.project.id, data)?;
            }
        }
        tracing::info!(
            "Restored backup from {} with {} projects",
            backup
                .exported_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "an unknown date".to_string()),
            projects.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::traits::MockKeyValueStore;
    use tasktrack_domain::{FieldUpdate, FieldValue, PROJECT_COLORS};

    fn service() -> StorageService {
        StorageService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_empty_store_defaults() {
        let service = service();
        let state = service.get_app_state();
        assert!(state.projects.is_empty());
        assert_eq!(state.current_project_id, None);
        assert!(!state.dark_mode);
        assert_eq!(service.get_project_data("nope"), ProjectData::default());
    }

    #[test]
    fn test_create_project_initialises_data() {
        let service = service();
        let project = service.create_project("Website", Some("Redesign")).unwrap();
        assert_eq!(project.color, PROJECT_COLORS[0]);
        assert_eq!(service.get_projects(), vec![project.clone()]);
        assert!(service
            .store()
            .get(&project_data_key(&project.id))
            .unwrap()
            .is_some());

        let second = service.create_project("Backend", None).unwrap();
        assert_eq!(second.color, PROJECT_COLORS[1]);
    }

    #[test]
    fn test_app_state_uses_project_list_from_projects_key() {
        let service = service();
        let project = service.create_project("Website", None).unwrap();
        service
            .save_app_state(&AppState {
                dark_mode: true,
                ..Default::default()
            })
            .unwrap();

        let state = service.get_app_state();
        assert!(state.dark_mode);
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.current_project_id, Some(project.id));
    }

    #[test]
    fn test_save_project_data_updates_counters() {
        let service = service();
        let project = service.create_project("Website", None).unwrap();

        let mut done = Task::new(&project.id);
        done.update_status("Deployed");
        service.add_task(&project.id, done).unwrap();
        service.add_task(&project.id, Task::blank(&project.id)).unwrap();

        let stored = service.get_project(&project.id).unwrap();
        assert_eq!(stored.task_count, 2);
        assert_eq!(stored.completed_count, 1);
    }

    #[test]
    fn test_update_and_delete_task() {
        let service = service();
        let project = service.create_project("Website", None).unwrap();
        let task = service.add_task(&project.id, Task::blank(&project.id)).unwrap();

        let updated = service
            .update_task(&project.id, &task.id, |t| {
                t.set_field("Priority", FieldValue::text("High"));
            })
            .unwrap();
        assert_eq!(updated.value_of("Priority").as_deref(), Some("High"));

        assert!(matches!(
            service.update_task(&project.id, "missing", |_| {}),
            Err(TrackerError::NotFound(_))
        ));

        assert!(service.delete_task(&project.id, &task.id).unwrap());
        assert!(!service.delete_task(&project.id, &task.id).unwrap());
        assert_eq!(service.get_project(&project.id).unwrap().task_count, 0);
    }

    #[test]
    fn test_update_project_merges_fields() {
        let service = service();
        let project = service.create_project("Website", Some("old")).unwrap();
        let updated = service
            .update_project(
                &project.id,
                ProjectUpdate {
                    name: Some("Site".into()),
                    description: FieldUpdate::NoChange,
                    color: Some(PROJECT_COLORS[4].into()),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Site");
        assert_eq!(updated.description.as_deref(), Some("old"));
        assert_eq!(updated.color, PROJECT_COLORS[4]);
        assert!(updated.updated_at >= project.updated_at);
    }

    #[test]
    fn test_delete_current_project_moves_to_first_remaining() {
        let service = service();
        let a = service.create_project("Alpha", None).unwrap();
        let b = service.create_project("Beta", None).unwrap();
        let c = service.create_project("Gamma", None).unwrap();
        service
            .save_app_state(&AppState {
                current_project_id: Some(b.id.clone()),
                ..Default::default()
            })
            .unwrap();

        assert!(service.delete_project(&b.id).unwrap());
        let state = service.get_app_state();
        assert_eq!(state.current_project_id, Some(a.id.clone()));
        assert_eq!(state.projects.len(), 2);
        assert!(service.store().get(&project_data_key(&b.id)).unwrap().is_none());

        assert!(!service.delete_project(&b.id).unwrap());
        assert!(service.delete_project(&a.id).unwrap());
        assert_eq!(service.get_app_state().current_project_id, Some(c.id));
    }

    #[test]
    fn test_corrupt_records_fall_back_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(PROJECTS_KEY, "{not json").unwrap();
        store.set(&project_data_key("p1"), "[1,2,3]").unwrap();
        let service = StorageService::new(store);

        assert!(service.get_projects().is_empty());
        assert_eq!(service.get_project_data("p1"), ProjectData::default());
    }

    #[test]
    fn test_created_at_survives_storage() {
        let service = service();
        let project = service.create_project("Website", None).unwrap();
        let task = service.add_task(&project.id, Task::blank(&project.id)).unwrap();

        let data = service.get_project_data(&project.id);
        assert_eq!(data.tasks[0].created_at, task.created_at);
        assert_eq!(service.get_project(&project.id).unwrap().created_at, project.created_at);
    }

    #[test]
    fn test_clear_all_data_keeps_foreign_keys() {
        let store = Arc::new(MemoryStore::new());
        store.set("other_app", "keep").unwrap();
        let service = StorageService::new(store.clone());
        service.create_project("Website", None).unwrap();
        assert!(service.total_storage_size() > 0);

        service.clear_all_data().unwrap();
        assert_eq!(service.total_storage_size(), 0);
        assert_eq!(store.keys().unwrap(), vec!["other_app"]);
    }

    #[test]
    fn test_backup_round_trip() {
        let service = service();
        let project = service.create_project("Website", None).unwrap();
        service.add_task(&project.id, Task::blank(&project.id)).unwrap();
        let backup = service.export_backup();
        assert_eq!(backup.version.as_deref(), Some("1.0.0"));

        let restored = StorageService::new(Arc::new(MemoryStore::new()));
        restored.create_project("Leftover", None).unwrap();
        restored.import_backup(&backup).unwrap();

        let projects = restored.get_projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, project.id);
        assert_eq!(restored.get_project_data(&project.id).tasks.len(), 1);
    }

    #[test]
    fn test_read_failure_falls_back() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(TrackerError::Storage("disk gone".into())));
        let service = StorageService::new(Arc::new(store));

        assert!(service.get_projects().is_empty());
        assert_eq!(service.get_app_state(), AppState::default());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().returning(|key, _| {
            Err(TrackerError::QuotaExceeded {
                key: key.to_string(),
                requested: 10,
                available: 0,
            })
        });
        let service = StorageService::new(Arc::new(store));

        let err = service.create_project("Website", None).unwrap_err();
        assert!(err.is_storage());
    }
}
