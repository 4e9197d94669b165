use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Maximum {max} projects allowed")]
    ProjectLimit { max: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported file type: {0}. Please upload a CSV, TXT, or Excel file.")]
    UnsupportedFileType(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No valid tasks found in {source_name}")]
    NoValidTasks { source_name: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage quota exceeded writing {key} ({requested} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        requested: usize,
        available: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Whether the error came from the storage layer rather than from user input.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::QuotaExceeded { .. } | Self::Serialization(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_valid_tasks_message() {
        let err = TrackerError::NoValidTasks {
            source_name: "the CSV data".to_string(),
        };
        assert_eq!(err.to_string(), "No valid tasks found in the CSV data");
    }

    #[test]
    fn test_project_limit_message() {
        let err = TrackerError::ProjectLimit { max: 10 };
        assert_eq!(err.to_string(), "Maximum 10 projects allowed");
    }

    #[test]
    fn test_storage_classification() {
        assert!(TrackerError::Storage("disk".into()).is_storage());
        assert!(TrackerError::QuotaExceeded {
            key: "k".into(),
            requested: 10,
            available: 1
        }
        .is_storage());
        assert!(!TrackerError::Validation("name".into()).is_storage());
        assert!(!TrackerError::Parse("bad".into()).is_storage());
    }
}
