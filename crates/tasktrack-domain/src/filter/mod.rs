//! Task filtering.
//!
//! The filter state persisted with a project (assignee, free-text search,
//! status, priority) maps onto composable [`TaskFilter`] implementations.

pub mod task_filter;

pub use task_filter::{
    AssigneeFilter, CompositeFilter, PriorityFilter, SearchFilter, StatusFilter, TaskFilter,
};
