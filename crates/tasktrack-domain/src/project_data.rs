use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tasktrack_core::{PageWindow, Paginator};

use crate::filter::{CompositeFilter, TaskFilter};
use crate::ingest::ImportBatch;
use crate::status::WorkflowStage;
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFilters {
    pub assignee: String,
    pub search: String,
    pub status: String,
    pub priority: String,
}

impl ProjectFilters {
    pub fn is_empty(&self) -> bool {
        self.assignee.is_empty()
            && self.search.is_empty()
            && self.status.is_empty()
            && self.priority.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Kanban,
    Table,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kanban" => Ok(Self::Kanban),
            "table" => Ok(Self::Table),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

/// Everything persisted for one project: its tasks, column schema and view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub filters: ProjectFilters,
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default = "first_page")]
    pub current_page: usize,
}

fn first_page() -> usize {
    1
}

impl Default for ProjectData {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            headers: Vec::new(),
            filters: ProjectFilters::default(),
            view: ViewMode::default(),
            current_page: first_page(),
        }
    }
}

impl ProjectData {
    /// Prepends an imported batch. Tasks are re-homed to `project_id`; headers
    /// become the union of the new and the known ones, new first.
    pub fn merge_import(&mut self, project_id: &str, batch: ImportBatch) {
        let ImportBatch { mut tasks, headers } = batch;
        for task in &mut tasks {
            task.project_id = project_id.to_string();
        }
        tasks.append(&mut self.tasks);
        self.tasks = tasks;
        self.headers = union_headers(&headers, &self.headers);
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Tasks passing the saved filters, in stored order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let filter = CompositeFilter::from_state(&self.filters);
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// What the current view shows: every visible task in kanban mode, one
    /// page of them in table mode.
    pub fn current_view(&self, paginator: &Paginator) -> (Vec<&Task>, PageWindow) {
        let visible = self.visible_tasks();
        let total = visible.len();
        match self.view {
            ViewMode::Kanban => (
                visible,
                PageWindow {
                    range: 0..total,
                    current_page: 1,
                    total_pages: usize::from(total > 0),
                },
            ),
            ViewMode::Table => {
                let window = paginator.window(self.current_page, total);
                let page = visible[window.range.clone()].to_vec();
                (page, window)
            }
        }
    }

    /// Visible tasks grouped into the workflow columns. Tasks whose status is
    /// not a workflow stage appear in no column.
    pub fn kanban_columns(&self) -> Vec<(WorkflowStage, Vec<&Task>)> {
        let visible = self.visible_tasks();
        WorkflowStage::ALL
            .into_iter()
            .map(|stage| {
                let tasks = visible
                    .iter()
                    .copied()
                    .filter(|t| t.status == stage.as_str())
                    .collect();
                (stage, tasks)
            })
            .collect()
    }
}

/// Order-preserving, de-duplicated union: `first`, then whatever of `second` is new.
pub fn union_headers(first: &[String], second: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    first
        .iter()
        .chain(second)
        .filter(|h| seen.insert(h.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;

    fn task_with(status: &str, assignee: &str) -> Task {
        let mut task = Task::new("p1");
        task.status = status.to_string();
        task.assignee = assignee.to_string();
        task
    }

    #[test]
    fn test_default_is_empty_kanban_first_page() {
        let data = ProjectData::default();
        assert!(data.tasks.is_empty());
        assert_eq!(data.view, ViewMode::Kanban);
        assert_eq!(data.current_page, 1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let data: ProjectData = serde_json::from_str(r#"{"headers":["Plan"]}"#).unwrap();
        assert_eq!(data.headers, vec!["Plan"]);
        assert_eq!(data.current_page, 1);
        assert!(data.filters.is_empty());
    }

    #[test]
    fn test_merge_import_prepends_and_unions_headers() {
        let mut data = ProjectData {
            tasks: vec![task_with("Bugs", "")],
            headers: vec!["Plan".into(), "Status".into()],
            ..Default::default()
        };
        let mut imported = Task::new("default_1");
        imported.fields.insert("Focus", FieldValue::text("x"));
        let batch = ImportBatch {
            tasks: vec![imported],
            headers: vec!["Focus".into(), "Status".into()],
        };

        data.merge_import("p9", batch);
        assert_eq!(data.tasks.len(), 2);
        assert_eq!(data.tasks[0].project_id, "p9");
        assert!(data.tasks[0].fields.contains_key("Focus"));
        assert_eq!(data.headers, vec!["Focus", "Status", "Plan"]);
    }

    #[test]
    fn test_add_and_delete_task() {
        let mut data = ProjectData::default();
        data.add_task(task_with("Bugs", ""));
        let newest = Task::blank("p1");
        let newest_id = newest.id.clone();
        data.add_task(newest);
        assert_eq!(data.tasks[0].id, newest_id);

        assert!(data.delete_task(&newest_id));
        assert!(!data.delete_task(&newest_id));
        assert_eq!(data.tasks.len(), 1);
    }

    #[test]
    fn test_table_view_paginates_visible_tasks() {
        let mut data = ProjectData {
            view: ViewMode::Table,
            current_page: 2,
            ..Default::default()
        };
        for i in 0..25 {
            data.tasks
                .push(task_with("Bugs", if i % 5 == 0 { "Ana" } else { "Bo" }));
        }

        let (page, window) = data.current_view(&Paginator::default());
        assert_eq!(page.len(), 5);
        assert_eq!(window.total_pages, 2);

        data.filters.assignee = "ana".into();
        let (page, window) = data.current_view(&Paginator::default());
        assert_eq!(page.len(), 5);
        assert_eq!(window.current_page, 1);
    }

    #[test]
    fn test_kanban_view_shows_everything() {
        let mut data = ProjectData::default();
        for _ in 0..30 {
            data.tasks.push(task_with("Bugs", ""));
        }
        let (tasks, window) = data.current_view(&Paginator::default());
        assert_eq!(tasks.len(), 30);
        assert_eq!(window.total_pages, 1);
    }

    #[test]
    fn test_kanban_columns_group_by_stage() {
        let mut data = ProjectData::default();
        data.tasks.push(task_with("Bugs", ""));
        data.tasks.push(task_with("Deployed", ""));
        data.tasks.push(task_with("Bugs", ""));
        data.tasks.push(task_with("Someday", ""));

        let columns = data.kanban_columns();
        assert_eq!(columns.len(), 6);
        let bugs = columns
            .iter()
            .find(|(stage, _)| *stage == WorkflowStage::Bugs)
            .unwrap();
        assert_eq!(bugs.1.len(), 2);
        let placed: usize = columns.iter().map(|(_, tasks)| tasks.len()).sum();
        assert_eq!(placed, 3);
    }

    #[test]
    fn test_union_headers() {
        let a = vec!["A".to_string(), "B".to_string()];
        let b = vec!["B".to_string(), "C".to_string(), "A".to_string()];
        assert_eq!(union_headers(&a, &b), vec!["A", "B", "C"]);
    }
}
