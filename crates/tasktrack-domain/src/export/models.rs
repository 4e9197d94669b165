//! Export data models.
//!
//! JSON shapes for single-project exports and whole-namespace backups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::project::Project;
use crate::project_data::ProjectData;

pub const BACKUP_VERSION: &str = "1.0.0";

/// One project together with its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectExport {
    pub project: Project,
    pub data: ProjectData,
}

/// A project entry inside a backup: the project's own fields plus its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupProject {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectData>,
}

/// Full backup of the tracker namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupExport {
    #[serde(default)]
    pub app_state: Option<AppState>,
    #[serde(default)]
    pub projects: Vec<BackupProject>,
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}

impl BackupExport {
    pub fn new(app_state: AppState, projects: Vec<BackupProject>) -> Self {
        Self {
            app_state: Some(app_state),
            projects,
            exported_at: Some(Utc::now()),
            version: Some(BACKUP_VERSION.to_string()),
        }
    }
}
