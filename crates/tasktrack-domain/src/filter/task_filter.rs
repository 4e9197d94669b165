use crate::field::FieldValue;
use crate::project_data::ProjectFilters;
use crate::Task;

/// Trait for filtering tasks by various criteria.
pub trait TaskFilter {
    /// Returns true if the task matches the filter criteria.
    fn matches(&self, task: &Task) -> bool;
}

/// Case-insensitive substring match on the assignee.
pub struct AssigneeFilter {
    needle: String,
}

impl AssigneeFilter {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_lowercase(),
        }
    }
}

impl TaskFilter for AssigneeFilter {
    fn matches(&self, task: &Task) -> bool {
        task.assignee.to_lowercase().contains(&self.needle)
    }
}

/// Case-insensitive substring match against every value of the task.
pub struct SearchFilter {
    query: String,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
        }
    }
}

impl TaskFilter for SearchFilter {
    fn matches(&self, task: &Task) -> bool {
        task.searchable_values()
            .any(|value| value.to_lowercase().contains(&self.query))
    }
}

/// Exact status match.
pub struct StatusFilter {
    status: String,
}

impl StatusFilter {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

impl TaskFilter for StatusFilter {
    fn matches(&self, task: &Task) -> bool {
        task.status == self.status
    }
}

/// Case-insensitive match on the `Priority` column.
pub struct PriorityFilter {
    priority: String,
}

impl PriorityFilter {
    pub fn new(priority: &str) -> Self {
        Self {
            priority: priority.trim().to_string(),
        }
    }
}

impl TaskFilter for PriorityFilter {
    fn matches(&self, task: &Task) -> bool {
        match task.fields.get("Priority") {
            Some(FieldValue::Text(value)) => value.trim().eq_ignore_ascii_case(&self.priority),
            Some(other) => other.to_string().eq_ignore_ascii_case(&self.priority),
            None => false,
        }
    }
}

/// Combine multiple filters with AND logic.
///
/// A task matches only if it passes all filters.
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn TaskFilter>>,
}

impl CompositeFilter {
    /// Create an empty composite filter (matches all tasks).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Box<dyn TaskFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Builds the filter chain for a project's saved filter state. Empty
    /// criteria are skipped.
    pub fn from_state(state: &ProjectFilters) -> Self {
        let mut composite = Self::new();
        if !state.assignee.is_empty() {
            composite = composite.with_filter(Box::new(AssigneeFilter::new(&state.assignee)));
        }
        if !state.search.is_empty() {
            composite = composite.with_filter(Box::new(SearchFilter::new(&state.search)));
        }
        if !state.status.is_empty() {
            composite = composite.with_filter(Box::new(StatusFilter::new(&state.status)));
        }
        if !state.priority.trim().is_empty() {
            composite = composite.with_filter(Box::new(PriorityFilter::new(&state.priority)));
        }
        composite
    }
}

impl TaskFilter for CompositeFilter {
    fn matches(&self, task: &Task) -> bool {
        self.filters.iter().all(|f| f.matches(task))
    }
}
