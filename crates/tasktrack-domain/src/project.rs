use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasktrack_core::{TrackerError, TrackerResult};

use crate::field_update::FieldUpdate;
use crate::task::{random_token, Task};

pub type ProjectId = String;

pub const PROJECT_COLORS: [&str; 10] = [
    "#3B82F6", // Blue
    "#10B981", // Emerald
    "#F59E0B", // Amber
    "#EF4444", // Red
    "#8B5CF6", // Violet
    "#06B6D4", // Cyan
    "#84CC16", // Lime
    "#F97316", // Orange
    "#EC4899", // Pink
    "#6366F1", // Indigo
];

pub const MAX_PROJECTS: usize = 10;
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 50;
pub const DESCRIPTION_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub task_count: usize,
    #[serde(default)]
    pub completed_count: usize,
    pub color: String,
}

/// Partial edit of a project's user-facing attributes.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: FieldUpdate<String>,
    pub color: Option<String>,
}

impl Project {
    pub fn new(name: &str, description: Option<&str>, color: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: format!("project_{}_{}", now.timestamp_millis(), random_token()),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_at: now,
            updated_at: now,
            task_count: 0,
            completed_count: 0,
            color: color.into(),
        }
    }

    /// Recomputes the cached counters from the project's full task list.
    pub fn update_counts(&mut self, tasks: &[Task]) {
        self.task_count = tasks.len();
        self.completed_count = tasks.iter().filter(|t| t.is_completed()).count();
        self.updated_at = Utc::now();
    }

    pub fn apply_update(&mut self, update: ProjectUpdate) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        update.description.apply_to(&mut self.description);
        if let Some(color) = update.color {
            self.color = color;
        }
        self.updated_at = Utc::now();
    }

    /// File-name-safe version of the project name.
    pub fn sanitized_name(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

/// First palette color no existing project uses; once the palette is
/// exhausted, colors cycle by project count.
pub fn pick_color(existing: &[Project]) -> &'static str {
    PROJECT_COLORS
        .iter()
        .copied()
        .find(|color| !existing.iter().any(|p| p.color == *color))
        .unwrap_or(PROJECT_COLORS[existing.len() % PROJECT_COLORS.len()])
}

/// Checks a project name and returns it trimmed.
///
/// `editing` names the project being renamed, which may keep its own name.
pub fn validate_name(name: &str, existing: &[Project], editing: Option<&str>) -> TrackerResult<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 {
        return Err(TrackerError::Validation("Project name is required".into()));
    }
    if len < NAME_MIN_LEN {
        return Err(TrackerError::Validation(format!(
            "Project name must be at least {} characters",
            NAME_MIN_LEN
        )));
    }
    if len > NAME_MAX_LEN {
        return Err(TrackerError::Validation(format!(
            "Project name must be at most {} characters",
            NAME_MAX_LEN
        )));
    }
    let lowered = name.to_lowercase();
    let duplicate = existing
        .iter()
        .filter(|p| editing != Some(p.id.as_str()))
        .any(|p| p.name.to_lowercase() == lowered);
    if duplicate {
        return Err(TrackerError::Validation(
            "A project with this name already exists".into(),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_description(description: &str) -> TrackerResult<()> {
    if description.trim().chars().count() > DESCRIPTION_MAX_LEN {
        return Err(TrackerError::Validation(format!(
            "Description must be at most {} characters",
            DESCRIPTION_MAX_LEN
        )));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> TrackerResult<()> {
    if PROJECT_COLORS.iter().any(|c| c.eq_ignore_ascii_case(color)) {
        Ok(())
    } else {
        Err(TrackerError::Validation(format!(
            "Color {} is not in the project palette",
            color
        )))
    }
}
