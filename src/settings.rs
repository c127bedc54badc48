// UPC Counter - persisted user settings
// Stored as JSON at ~/.upc-counter/settings.json. A missing or unreadable
// file falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FILE_NAME, MAX_RECENT_FILES, SETTINGS_DIR, SETTINGS_FILENAME, SETTINGS_VERSION};
use crate::error::{CounterError, Result};

/// Recently opened or saved spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub path: PathBuf,
    pub last_used: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub version: u32,
    #[serde(default)]
    pub recent_files: Vec<RecentFile>,
    #[serde(default = "default_file_name")]
    pub default_file_name: String,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            recent_files: Vec::new(),
            default_file_name: default_file_name(),
        }
    }
}

/// Path to ~/.upc-counter/settings.json
pub fn settings_path() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| CounterError::Io(std::io::Error::other("could not determine home directory")))?;
    Ok(home.home_dir().join(SETTINGS_DIR).join(SETTINGS_FILENAME))
}

impl Settings {
    pub fn load() -> Self {
        match settings_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                log::warn!("Settings unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Move `path` to the front of the recent list, dropping the oldest past the cap.
    pub fn remember(&mut self, path: &Path) {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.recent_files.retain(|f| f.path != path);
        self.recent_files.insert(
            0,
            RecentFile {
                path,
                last_used: Local::now().naive_local(),
            },
        );
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}
