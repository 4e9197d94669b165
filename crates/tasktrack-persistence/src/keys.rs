//! The storage namespace.
//!
//! Every key the tracker owns starts with [`KEY_PREFIX`]; nothing outside the
//! prefix is read, written or cleared.

use tasktrack_domain::ProjectId;

pub const KEY_PREFIX: &str = "taskManager_";
pub const APP_STATE_KEY: &str = "taskManager_appState";
pub const PROJECTS_KEY: &str = "taskManager_projects";
const PROJECT_DATA_PREFIX: &str = "taskManager_project_";

pub fn project_data_key(project_id: &str) -> String {
    format!("{}{}", PROJECT_DATA_PREFIX, project_id)
}

pub fn is_tracker_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}

/// What a key holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    AppState,
    Projects,
    ProjectData(ProjectId),
}

impl KeyKind {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            APP_STATE_KEY => Some(Self::AppState),
            PROJECTS_KEY => Some(Self::Projects),
            _ => key
                .strip_prefix(PROJECT_DATA_PREFIX)
                .filter(|id| !id.is_empty())
                .map(|id| Self::ProjectData(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key = project_data_key("project_1_abc");
        assert_eq!(key, "taskManager_project_project_1_abc");
        assert_eq!(
            KeyKind::parse(&key),
            Some(KeyKind::ProjectData("project_1_abc".into()))
        );
    }

    #[test]
    fn test_fixed_keys() {
        assert_eq!(KeyKind::parse(APP_STATE_KEY), Some(KeyKind::AppState));
        assert_eq!(KeyKind::parse(PROJECTS_KEY), Some(KeyKind::Projects));
    }

    #[test]
    fn test_foreign_and_legacy_keys_are_ignored() {
        assert_eq!(KeyKind::parse("theme"), None);
        assert_eq!(KeyKind::parse("taskManager_project_"), None);
        assert_eq!(KeyKind::parse("taskManager_currentProject"), None);
        assert!(!is_tracker_key("tasks"));
        assert!(is_tracker_key("taskManager_currentProject"));
    }
}
