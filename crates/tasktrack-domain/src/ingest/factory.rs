use chrono::Utc;

use super::normalizer::{is_system_field, resolve_assignee, resolve_status};
use super::raw::RawRow;
use crate::field::TaskFields;
use crate::task::{generate_task_id, Task};

/// Builds tasks from raw rows against one canonical header list.
pub struct TaskFactory<'a> {
    headers: &'a [String],
    project_id: &'a str,
}

impl<'a> TaskFactory<'a> {
    pub fn new(headers: &'a [String], project_id: &'a str) -> Self {
        Self {
            headers,
            project_id,
        }
    }

    /// One task per row. The row's own `id` is kept when present; the creation
    /// time is always the import time, whatever dates the row carries.
    pub fn build(&self, row: &RawRow) -> Task {
        let id = row
            .get("id")
            .map(|id| id.to_string().trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_task_id(self.project_id));

        let mut fields = TaskFields::new();
        for header in self.headers {
            if is_system_field(header) {
                continue;
            }
            if let Some(value) = row.get(header) {
                fields.insert(header.clone(), value.clone());
            }
        }

        Task {
            id,
            status: resolve_status(row),
            assignee: resolve_assignee(row),
            created_at: Utc::now(),
            project_id: self.project_id.to_string(),
            fields,
        }
    }
}
