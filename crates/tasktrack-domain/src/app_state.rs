use serde::{Deserialize, Serialize};

use crate::project::{Project, ProjectId};

/// Session-wide UI state persisted under its own key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub current_project_id: Option<ProjectId>,
    pub projects: Vec<Project>,
    pub dark_mode: bool,
    pub sidebar_collapsed: bool,
}

impl AppState {
    pub fn current_project(&self) -> Option<&Project> {
        let id = self.current_project_id.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Points the session at a valid project: keeps the current one if it
    /// still exists, otherwise falls back to the first project (or none).
    pub fn ensure_current(&mut self) {
        let valid = self
            .current_project_id
            .as_deref()
            .is_some_and(|id| self.projects.iter().any(|p| p.id == id));
        if !valid {
            self.current_project_id = self.projects.first().map(|p| p.id.clone());
        }
    }
}
