use tasktrack_core::{PageWindow, Paginator, TrackerError, TrackerResult};
use tasktrack_domain::ingest::normalizer::is_status_column;
use tasktrack_domain::project::{validate_color, validate_description, validate_name};
use tasktrack_domain::{
    unique_assignees, AppState, FieldEdit, FieldUpdate, FieldValue, ImportBatch, Project,
    ProjectData, ProjectFilters, ProjectId, ProjectUpdate, Task, TaskStats, TrackerOperations,
    ViewMode, WorkflowStage, MAX_PROJECTS,
};

use crate::storage_service::StorageService;
use crate::sync::ReloadEvent;

/// One open view of the tracker: the session state plus the current
/// project's data, written through to storage after every change.
pub struct TaskManager {
    storage: StorageService,
    state: AppState,
    data: ProjectData,
    paginator: Paginator,
}

impl TaskManager {
    pub fn open(storage: StorageService) -> Self {
        Self::with_paginator(storage, Paginator::default())
    }

    pub fn with_paginator(storage: StorageService, paginator: Paginator) -> Self {
        let mut manager = Self {
            storage,
            state: AppState::default(),
            data: ProjectData::default(),
            paginator,
        };
        manager.reload_all();
        manager
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn project_data(&self) -> &ProjectData {
        &self.data
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.data.tasks)
    }

    pub fn assignees(&self) -> Vec<String> {
        unique_assignees(&self.data.tasks)
    }

    pub fn kanban_columns(&self) -> Vec<(WorkflowStage, Vec<&Task>)> {
        self.data.kanban_columns()
    }

    fn current_id(&self) -> TrackerResult<ProjectId> {
        self.state
            .current_project_id
            .clone()
            .ok_or_else(|| TrackerError::NotFound("No project selected".into()))
    }

    fn load_current_data(&mut self) {
        self.data = match &self.state.current_project_id {
            Some(id) => self.storage.get_project_data(id),
            None => ProjectData::default(),
        };
    }

    fn reload_all(&mut self) {
        self.state = self.storage.get_app_state();
        self.load_current_data();
        tracing::debug!(
            "Loaded {} projects, current {:?}",
            self.state.projects.len(),
            self.state.current_project_id
        );
    }

    /// Re-reads the project list (and with it the cached counters).
    fn refresh_projects(&mut self) {
        let previous = self.state.current_project_id.clone();
        self.state.projects = self.storage.get_projects();
        self.state.ensure_current();
        if self.state.current_project_id != previous {
            self.load_current_data();
        }
    }

    fn save_state(&self) -> TrackerResult<()> {
        self.storage.save_app_state(&self.state)
    }

    fn save_data(&mut self) -> TrackerResult<()> {
        let id = self.current_id()?;
        self.storage.save_project_data(&id, &self.data)?;
        self.refresh_projects();
        Ok(())
    }

    /// Applies another view's change by re-reading what it touched.
    pub fn apply_reload(&mut self, event: &ReloadEvent) {
        tracing::debug!("Applying reload {:?}", event);
        match event {
            ReloadEvent::AppState => {
                let previous = self.state.current_project_id.clone();
                self.state = self.storage.get_app_state();
                if self.state.current_project_id != previous {
                    self.load_current_data();
                }
            }
            ReloadEvent::Projects => self.refresh_projects(),
            ReloadEvent::ProjectData(id) => {
                if self.state.current_project_id.as_deref() == Some(id.as_str()) {
                    self.data = self.storage.get_project_data(id);
                }
            }
            ReloadEvent::All => self.reload_all(),
        }
    }

    fn edit_task<F>(&mut self, id: &str, edit: F) -> TrackerResult<Task>
    where
        F: FnOnce(&mut Task),
    {
        let project_id = self.current_id()?;
        let task = self.storage.update_task(&project_id, id, edit)?;
        self.data = self.storage.get_project_data(&project_id);
        self.refresh_projects();
        Ok(task)
    }
}

impl TrackerOperations for TaskManager {
    fn list_projects(&self) -> Vec<Project> {
        self.state.projects.clone()
    }

    fn current_project(&self) -> Option<Project> {
        self.state.current_project().cloned()
    }

    fn create_project(&mut self, name: &str, description: Option<&str>) -> TrackerResult<Project> {
        // Another view may have added projects since this one last looked.
        self.refresh_projects();
        if self.state.projects.len() >= MAX_PROJECTS {
            return Err(TrackerError::ProjectLimit { max: MAX_PROJECTS });
        }
        let name = validate_name(name, &self.state.projects, None)?;
        if let Some(description) = description {
            validate_description(description)?;
        }

        let project = self.storage.create_project(&name, description)?;
        self.state.projects = self.storage.get_projects();
        self.state.current_project_id = Some(project.id.clone());
        self.load_current_data();
        self.save_state()?;
        Ok(project)
    }

    fn update_project(&mut self, id: &str, update: ProjectUpdate) -> TrackerResult<Project> {
        self.refresh_projects();
        if !self.state.projects.iter().any(|p| p.id == id) {
            return Err(TrackerError::NotFound(format!("Project {}", id)));
        }
        let mut update = update;
        if let Some(name) = &update.name {
            update.name = Some(validate_name(name, &self.state.projects, Some(id))?);
        }
        if let FieldUpdate::Set(description) = &update.description {
            validate_description(description)?;
            if description.trim().is_empty() {
                update.description = FieldUpdate::Clear;
            } else {
                update.description = FieldUpdate::Set(description.trim().to_string());
            }
        }
        if let Some(color) = &update.color {
            validate_color(color)?;
        }

        let project = self.storage.update_project(id, update)?;
        self.refresh_projects();
        self.save_state()?;
        Ok(project)
    }

    fn select_project(&mut self, id: &str) -> TrackerResult<Project> {
        let project = self
            .state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("Project {}", id)))?;
        if self.state.current_project_id.as_deref() != Some(id) {
            self.state.current_project_id = Some(project.id.clone());
            self.load_current_data();
            self.save_state()?;
        }
        Ok(project)
    }

    fn delete_project(&mut self, id: &str) -> TrackerResult<()> {
        if !self.storage.delete_project(id)? {
            return Err(TrackerError::NotFound(format!("Project {}", id)));
        }
        self.refresh_projects();
        self.save_state()
    }

    fn import_batch(&mut self, batch: ImportBatch) -> TrackerResult<usize> {
        let project_id = self.current_id()?;
        let count = self.storage.import_tasks(&project_id, batch)?;
        self.data = self.storage.get_project_data(&project_id);
        self.refresh_projects();
        Ok(count)
    }

    fn add_task(&mut self) -> TrackerResult<Task> {
        let project_id = self.current_id()?;
        let task = self.storage.add_task(&project_id, Task::blank(&project_id))?;
        self.data = self.storage.get_project_data(&project_id);
        self.refresh_projects();
        Ok(task)
    }

    fn get_task(&self, id: &str) -> TrackerResult<Option<Task>> {
        self.current_id()?;
        Ok(self.data.task(id).cloned())
    }

    fn change_status(&mut self, id: &str, status: &str) -> TrackerResult<Task> {
        let status = status.trim().to_string();
        if status.is_empty() {
            return Err(TrackerError::Validation("Status cannot be empty".into()));
        }
        self.edit_task(id, |task| task.update_status(status))
    }

    fn edit_field(&mut self, id: &str, field: &str, value: FieldValue) -> TrackerResult<Task> {
        if FieldEdit::classify(field, &value) == FieldEdit::Ignored {
            return Err(TrackerError::Validation(if is_status_column(field.trim()) {
                "Status cannot be empty".into()
            } else {
                format!("Field '{}' cannot be edited", field.trim())
            }));
        }
        self.edit_task(id, |task| {
            let edit = task.set_field(field, value);
            tracing::debug!("Task {}: {:?} edit of '{}'", task.id, edit, field);
        })
    }

    fn delete_task(&mut self, id: &str) -> TrackerResult<()> {
        let project_id = self.current_id()?;
        if !self.storage.delete_task(&project_id, id)? {
            return Err(TrackerError::NotFound(format!("Task {}", id)));
        }
        self.data = self.storage.get_project_data(&project_id);
        self.refresh_projects();
        Ok(())
    }

    fn list_tasks(&self) -> TrackerResult<(Vec<Task>, PageWindow)> {
        self.current_id()?;
        let (tasks, window) = self.data.current_view(&self.paginator);
        Ok((tasks.into_iter().cloned().collect(), window))
    }

    fn set_filters(&mut self, filters: ProjectFilters) -> TrackerResult<()> {
        self.current_id()?;
        self.data.filters = filters;
        self.data.current_page = 1;
        self.save_data()
    }

    fn set_view(&mut self, view: ViewMode) -> TrackerResult<()> {
        self.current_id()?;
        self.data.view = view;
        self.save_data()
    }

    fn set_page(&mut self, page: usize) -> TrackerResult<PageWindow> {
        self.current_id()?;
        let window = self
            .paginator
            .window(page, self.data.visible_tasks().len());
        self.data.current_page = window.current_page;
        self.save_data()?;
        Ok(window)
    }

    fn toggle_dark_mode(&mut self) -> TrackerResult<bool> {
        self.state.dark_mode = !self.state.dark_mode;
        self.save_state()?;
        Ok(self.state.dark_mode)
    }

    fn toggle_sidebar(&mut self) -> TrackerResult<bool> {
        self.state.sidebar_collapsed = !self.state.sidebar_collapsed;
        self.save_state()?;
        Ok(self.state.sidebar_collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tasktrack_domain::PROJECT_COLORS;

    fn manager() -> TaskManager {
        TaskManager::open(StorageService::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn test_operations_need_a_project() {
        let mut manager = manager();
        assert!(matches!(manager.add_task(), Err(TrackerError::NotFound(_))));
        assert!(manager.list_tasks().is_err());
    }

    #[test]
    fn test_create_switches_to_new_project() {
        let mut manager = manager();
        let first = manager.create_project("Alpha", None).unwrap();
        let second = manager.create_project("Beta", Some("second")).unwrap();

        assert_eq!(manager.current_project().unwrap().id, second.id);
        assert_eq!(manager.list_projects().len(), 2);
        assert_eq!(first.color, PROJECT_COLORS[0]);
        assert_eq!(second.color, PROJECT_COLORS[1]);
    }

    #[test]
    fn test_create_validates_name() {
        let mut manager = manager();
        manager.create_project("Alpha", None).unwrap();
        assert!(matches!(
            manager.create_project("alpha", None),
            Err(TrackerError::Validation(_))
        ));
        assert!(manager.create_project("A", None).is_err());
        assert!(manager.create_project("Desc", Some(&"d".repeat(201))).is_err());
        assert_eq!(manager.list_projects().len(), 1);
    }

    #[test]
    fn test_rename_may_keep_own_name() {
        let mut manager = manager();
        let project = manager.create_project("Alpha", None).unwrap();
        let renamed = manager
            .update_project(
                &project.id,
                ProjectUpdate {
                    name: Some("ALPHA".into()),
                    description: FieldUpdate::Set("  ".into()),
                    color: None,
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "ALPHA");
        assert_eq!(renamed.description, None);

        let bad_color = ProjectUpdate {
            color: Some("#000000".into()),
            ..Default::default()
        };
        assert!(manager.update_project(&project.id, bad_color).is_err());
    }

    #[test]
    fn test_task_lifecycle_updates_counters() {
        let mut manager = manager();
        let project = manager.create_project("Alpha", None).unwrap();

        let task = manager.add_task().unwrap();
        assert_eq!(task.display_name(), "New Task");
        assert_eq!(task.status, "Not Started");

        manager.change_status(&task.id, "Deployed").unwrap();
        let edited = manager
            .edit_field(&task.id, "Assigned To", FieldValue::text("Ana"))
            .unwrap();
        assert_eq!(edited.assignee, "Ana");

        let current = manager.current_project().unwrap();
        assert_eq!(current.id, project.id);
        assert_eq!(current.task_count, 1);
        assert_eq!(current.completed_count, 1);
        assert_eq!(manager.stats().completion_rate(), 100);

        manager.delete_task(&task.id).unwrap();
        assert!(manager.delete_task(&task.id).is_err());
        assert_eq!(manager.current_project().unwrap().task_count, 0);
    }

    #[test]
    fn test_blank_status_rejected() {
        let mut manager = manager();
        manager.create_project("Alpha", None).unwrap();
        let task = manager.add_task().unwrap();
        assert!(manager.change_status(&task.id, "  ").is_err());
        assert!(matches!(
            manager.edit_field(&task.id, "Status", FieldValue::text("")),
            Err(TrackerError::Validation(_))
        ));
        assert!(manager
            .edit_field(&task.id, "createdAt", FieldValue::text("x"))
            .is_err());
        assert_eq!(manager.project_data().tasks[0].status, "Not Started");
    }

    #[test]
    fn test_table_view_paging_and_filters() {
        let mut manager = manager();
        manager.create_project("Alpha", None).unwrap();
        for _ in 0..45 {
            manager.add_task().unwrap();
        }

        let (tasks, _) = manager.list_tasks().unwrap();
        assert_eq!(tasks.len(), 45);

        manager.set_view(ViewMode::Table).unwrap();
        let window = manager.set_page(9).unwrap();
        assert_eq!(window.current_page, 3);
        let (tasks, window) = manager.list_tasks().unwrap();
        assert_eq!(tasks.len(), 5);
        assert_eq!(window.total_pages, 3);

        manager
            .set_filters(ProjectFilters {
                search: "nothing matches this".into(),
                ..Default::default()
            })
            .unwrap();
        let (tasks, window) = manager.list_tasks().unwrap();
        assert!(tasks.is_empty());
        assert_eq!(window.current_page, 1);
    }

    #[test]
    fn test_toggles_persist() {
        let storage = StorageService::new(Arc::new(MemoryStore::new()));
        let mut manager = TaskManager::open(storage.clone());
        assert!(manager.toggle_dark_mode().unwrap());
        assert!(manager.toggle_sidebar().unwrap());

        let reopened = TaskManager::open(storage);
        assert!(reopened.state().dark_mode);
        assert!(reopened.state().sidebar_collapsed);
    }

    #[test]
    fn test_select_unknown_project() {
        let mut manager = manager();
        assert!(matches!(
            manager.select_project("nope"),
            Err(TrackerError::NotFound(_))
        ));
    }
}
