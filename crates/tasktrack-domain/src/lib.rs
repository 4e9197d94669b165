pub mod app_state;
pub mod export;
pub mod field;
pub mod field_update;
pub mod filter;
pub mod ingest;
pub mod operations;
pub mod project;
pub mod project_data;
pub mod stats;
pub mod status;
pub mod task;

pub use app_state::AppState;
pub use field::{FieldValue, TaskFields};
pub use field_update::FieldUpdate;
pub use filter::{CompositeFilter, TaskFilter};
pub use ingest::{BatchProcessor, ImportBatch, RawRow, TaskFactory};
pub use operations::TrackerOperations;
pub use project::{pick_color, Project, ProjectId, ProjectUpdate, MAX_PROJECTS, PROJECT_COLORS};
pub use project_data::{ProjectData, ProjectFilters, ViewMode};
pub use stats::{unique_assignees, TaskStats};
pub use status::{WorkflowStage, COMPLETED, NOT_STARTED};
pub use task::{FieldEdit, Task, TaskId};
