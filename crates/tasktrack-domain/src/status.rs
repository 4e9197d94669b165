use serde::{Deserialize, Serialize};

pub const NOT_STARTED: &str = "Not Started";
pub const COMPLETED: &str = "Deployed";

/// The fixed, ordered workflow a task moves through.
///
/// Tasks store their status as free text so that imported values outside this
/// set survive a round trip; `WorkflowStage::from_label` returns `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStage {
    NotStarted,
    InProgress,
    Bugs,
    DevCompleted,
    Tested,
    Deployed,
}

impl WorkflowStage {
    pub const ALL: [WorkflowStage; 6] = [
        WorkflowStage::NotStarted,
        WorkflowStage::InProgress,
        WorkflowStage::Bugs,
        WorkflowStage::DevCompleted,
        WorkflowStage::Tested,
        WorkflowStage::Deployed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => NOT_STARTED,
            Self::InProgress => "In Progress",
            Self::Bugs => "Bugs",
            Self::DevCompleted => "Dev Completed",
            Self::Tested => "Tested",
            Self::Deployed => COMPLETED,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == label)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Deployed
    }

    /// Cell fill used when a stage is colour coded in a spreadsheet (RGB).
    pub fn fill_rgb(self) -> u32 {
        match self {
            Self::NotStarted => 0xF3F4F6,
            Self::InProgress => 0xDBEAFE,
            Self::Bugs => 0xFECACA,
            Self::DevCompleted => 0xD1FAE5,
            Self::Tested => 0xEDE9FE,
            Self::Deployed => 0xE0E7FF,
        }
    }

    /// Fill for any status label; unknown labels get the `Not Started` style.
    pub fn fill_for_label(label: &str) -> u32 {
        Self::from_label(label)
            .unwrap_or(Self::NotStarted)
            .fill_rgb()
    }
}

impl std::fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn stage_labels() -> impl Iterator<Item = &'static str> {
    WorkflowStage::ALL.into_iter().map(WorkflowStage::as_str)
}
