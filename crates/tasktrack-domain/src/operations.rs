use tasktrack_core::{PageWindow, TrackerResult};

use crate::field::FieldValue;
use crate::ingest::ImportBatch;
use crate::project::{Project, ProjectUpdate};
use crate::project_data::{ProjectFilters, ViewMode};
use crate::task::Task;

/// Every action a tracker session offers, whatever drives it.
///
/// Task and view-state operations act on the current project and fail with
/// `NotFound` when there is none.
pub trait TrackerOperations {
    // Project operations
    fn list_projects(&self) -> Vec<Project>;
    fn current_project(&self) -> Option<Project>;
    fn create_project(&mut self, name: &str, description: Option<&str>) -> TrackerResult<Project>;
    fn update_project(&mut self, id: &str, update: ProjectUpdate) -> TrackerResult<Project>;
    fn select_project(&mut self, id: &str) -> TrackerResult<Project>;
    fn delete_project(&mut self, id: &str) -> TrackerResult<()>;

    // Task operations
    fn import_batch(&mut self, batch: ImportBatch) -> TrackerResult<usize>;
    fn add_task(&mut self) -> TrackerResult<Task>;
    fn get_task(&self, id: &str) -> TrackerResult<Option<Task>>;
    fn change_status(&mut self, id: &str, status: &str) -> TrackerResult<Task>;
    fn edit_field(&mut self, id: &str, field: &str, value: FieldValue) -> TrackerResult<Task>;
    fn delete_task(&mut self, id: &str) -> TrackerResult<()>;
    /// Tasks shown by the current view: filtered, and paginated in table mode.
    fn list_tasks(&self) -> TrackerResult<(Vec<Task>, PageWindow)>;

    // View state
    fn set_filters(&mut self, filters: ProjectFilters) -> TrackerResult<()>;
    fn set_view(&mut self, view: ViewMode) -> TrackerResult<()>;
    fn set_page(&mut self, page: usize) -> TrackerResult<PageWindow>;
    fn toggle_dark_mode(&mut self) -> TrackerResult<bool>;
    fn toggle_sidebar(&mut self) -> TrackerResult<bool>;
}
