use chrono::Utc;
use std::collections::HashSet;
use tasktrack_core::{TrackerError, TrackerResult};

use super::factory::TaskFactory;
use super::normalizer::canonical_headers;
use super::raw::RawRow;
use crate::task::{generate_task_id, Task};

/// Tasks and canonical headers produced from one parsed table.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub tasks: Vec<Task>,
    pub headers: Vec<String>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Turns an empty batch into the "no valid tasks" error, reported once per import.
    pub fn require_tasks(self, source_name: &str) -> TrackerResult<Self> {
        if self.tasks.is_empty() {
            return Err(TrackerError::NoValidTasks {
                source_name: source_name.to_string(),
            });
        }
        Ok(self)
    }
}

pub struct BatchProcessor;

impl BatchProcessor {
    /// Normalizes a whole table.
    ///
    /// Blank rows are dropped silently. Every admitted row shares the canonical
    /// headers and the project id; without a project id, `default_{millis}` is
    /// used. Ids are made unique within the batch: a repeated or blank row id
    /// gets a generated one.
    pub fn process<S: AsRef<str>>(
        rows: &[RawRow],
        raw_headers: &[S],
        project_id: Option<&str>,
    ) -> ImportBatch {
        let headers = canonical_headers(raw_headers);
        let project_id = project_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("default_{}", Utc::now().timestamp_millis()));

        let factory = TaskFactory::new(&headers, &project_id);
        let mut seen: HashSet<String> = HashSet::new();
        let mut tasks = Vec::with_capacity(rows.len());

        for row in rows.iter().filter(|row| row.has_content()) {
            let mut task = factory.build(row);
            while !seen.insert(task.id.clone()) {
                tracing::debug!("Duplicate task id {} in batch, generating a new one", task.id);
                task.id = generate_task_id(&project_id);
            }
            tasks.push(task);
        }

        tracing::debug!(
            "Processed {} rows into {} tasks for project {}",
            rows.len(),
            tasks.len(),
            project_id
        );

        ImportBatch { tasks, headers }
    }
}
