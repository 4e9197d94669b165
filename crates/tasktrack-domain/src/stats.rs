use std::collections::BTreeMap;

use crate::status::WorkflowStage;
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub by_stage: BTreeMap<WorkflowStage, usize>,
    /// Tasks whose status is outside the workflow.
    pub other: usize,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = Self {
            by_stage: WorkflowStage::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Self::default()
        };
        for task in tasks {
            stats.total += 1;
            match task.stage() {
                Some(stage) => *stats.by_stage.entry(stage).or_default() += 1,
                None => stats.other += 1,
            }
        }
        stats
    }

    pub fn count(&self, stage: WorkflowStage) -> usize {
        self.by_stage.get(&stage).copied().unwrap_or(0)
    }

    pub fn completed(&self) -> usize {
        self.count(WorkflowStage::Deployed)
    }

    /// Completed share as a whole percentage, rounded half up.
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed() as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Distinct non-empty assignees, trimmed and sorted.
pub fn unique_assignees<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<String> {
    let mut names: Vec<String> = tasks
        .into_iter()
        .map(|t| t.assignee.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: &str, assignee: &str) -> Task {
        let mut task = Task::new("p1");
        task.status = status.into();
        task.assignee = assignee.into();
        task
    }

    #[test]
    fn test_empty_stats() {
        let stats = TaskStats::from_tasks(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate(), 0);
        assert_eq!(stats.by_stage.len(), 6);
    }

    #[test]
    fn test_counts_and_rate() {
        let tasks = vec![
            task("Deployed", ""),
            task("Bugs", ""),
            task("Bugs", ""),
            task("Parked", ""),
        ];
        let stats = TaskStats::from_tasks(&tasks);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(WorkflowStage::Bugs), 2);
        assert_eq!(stats.other, 1);
        assert_eq!(stats.completion_rate(), 25);

        let third = TaskStats::from_tasks(&tasks[..3]);
        assert_eq!(third.completion_rate(), 33);
    }

    #[test]
    fn test_unique_assignees() {
        let tasks = vec![
            task("Bugs", " Bo "),
            task("Bugs", "Ana"),
            task("Bugs", ""),
            task("Bugs", "Bo"),
        ];
        assert_eq!(unique_assignees(&tasks), vec!["Ana", "Bo"]);
    }
}
