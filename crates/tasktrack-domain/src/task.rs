use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::field::{FieldValue, TaskFields};
use crate::ingest::normalizer::{is_assignee_alias, is_status_column};
use crate::status::{WorkflowStage, NOT_STARTED};

pub type TaskId = String;

/// Fields consulted, in order, when a task needs a human-readable title.
const DISPLAY_NAME_FIELDS: [&str; 9] = [
    "Task Name",
    "Plan",
    "Focus",
    "Project",
    "Key Topics",
    "Title",
    "Name",
    "Task",
    "Description",
];

pub const NEW_TASK_NAME: &str = "New Task";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub project_id: String,
    #[serde(flatten)]
    pub fields: TaskFields,
}

fn default_status() -> String {
    NOT_STARTED.to_string()
}

/// Short random token appended to generated identifiers.
pub fn random_token() -> String {
    Uuid::new_v4().simple().to_string()[..9].to_string()
}

/// `{project_id}_{millis}_{token}`; unique in practice, not enforced.
pub fn generate_task_id(project_id: &str) -> TaskId {
    format!(
        "{}_{}_{}",
        project_id,
        Utc::now().timestamp_millis(),
        random_token()
    )
}

/// What a field edit did to the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    Status,
    Assignee,
    Field,
    Removed,
    Ignored,
}

impl FieldEdit {
    /// What setting `key` to `value` would do, without touching a task.
    ///
    /// Identity columns and a blank status are refused.
    pub fn classify(key: &str, value: &FieldValue) -> Self {
        let key = key.trim();
        if key.is_empty()
            || key.eq_ignore_ascii_case("id")
            || key.eq_ignore_ascii_case("createdAt")
            || key.eq_ignore_ascii_case("projectId")
        {
            return Self::Ignored;
        }
        if is_status_column(key) {
            return if value.to_string().trim().is_empty() {
                Self::Ignored
            } else {
                Self::Status
            };
        }
        if is_assignee_alias(key) {
            Self::Assignee
        } else if value.is_blank() {
            Self::Removed
        } else {
            Self::Field
        }
    }
}

impl Task {
    pub fn new(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            id: generate_task_id(&project_id),
            status: default_status(),
            assignee: String::new(),
            created_at: Utc::now(),
            project_id,
            fields: TaskFields::new(),
        }
    }

    /// The task the "add task" action creates.
    pub fn blank(project_id: impl Into<String>) -> Self {
        let mut task = Self::new(project_id);
        task.fields
            .insert("Task Name", FieldValue::text(NEW_TASK_NAME));
        task
    }

    pub fn stage(&self) -> Option<WorkflowStage> {
        WorkflowStage::from_label(&self.status)
    }

    pub fn is_completed(&self) -> bool {
        self.stage().is_some_and(WorkflowStage::is_terminal)
    }

    pub fn update_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Apply one cell edit.
    ///
    /// Status and assignee columns (under any alias) route to the core fields.
    /// Refused edits leave the task untouched. Blank values remove the field
    /// so the record stays sparse.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> FieldEdit {
        let edit = FieldEdit::classify(key, &value);
        let key = key.trim();
        match edit {
            FieldEdit::Ignored => {}
            FieldEdit::Status => self.status = value.to_string().trim().to_string(),
            FieldEdit::Assignee => self.assignee = value.to_string().trim().to_string(),
            FieldEdit::Removed => {
                self.fields.remove(key);
            }
            FieldEdit::Field => {
                self.fields.insert(key, value);
            }
        }
        edit
    }

    /// Display text for a column, resolving status and assignee aliases.
    pub fn value_of(&self, column: &str) -> Option<String> {
        if is_status_column(column) {
            return Some(self.status.clone());
        }
        if is_assignee_alias(column) {
            return Some(self.assignee.clone());
        }
        self.fields.get(column).map(ToString::to_string)
    }

    pub fn display_name(&self) -> String {
        for field in DISPLAY_NAME_FIELDS {
            if let Some(FieldValue::Text(value)) = self.fields.get(field) {
                if !value.trim().is_empty() {
                    return value.trim().to_string();
                }
            }
        }
        self.fields
            .iter()
            .find_map(|(_, value)| match value {
                FieldValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "Untitled Task".to_string())
    }

    /// Every value of the record as text, as the free-text search sees it.
    pub fn searchable_values(&self) -> impl Iterator<Item = String> + '_ {
        [
            self.id.clone(),
            self.status.clone(),
            self.assignee.clone(),
            self.project_id.clone(),
            self.created_at.to_rfc3339(),
        ]
        .into_iter()
        .chain(self.fields.iter().map(|(_, v)| v.to_string()))
    }
}
