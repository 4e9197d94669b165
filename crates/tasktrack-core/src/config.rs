use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pagination::ITEMS_PER_PAGE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage file used when none is given on the command line.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Table view page size.
    #[serde(default)]
    pub items_per_page: Option<usize>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/tasktrack/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("tasktrack/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("tasktrack\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Reads a config file, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = std::fs::read_to_string(path) {
                if let Ok(config) = toml::from_str(&content) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn effective_data_file(&self) -> Option<PathBuf> {
        self.data_file
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tasktrack").join("storage.json")))
    }

    pub fn effective_items_per_page(&self) -> usize {
        match self.items_per_page {
            Some(n) if n > 0 => n,
            _ => ITEMS_PER_PAGE,
        }
    }
}
