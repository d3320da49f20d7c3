//! Persisted user settings (lives in the OS config directory).

use anyhow::{Context, Result};
use log::warn;
use std::path::{Path, PathBuf};

use crate::editor::EditorConfig;

const SETTINGS_FILE: &str = "settings.json";
const BOOK_FILE: &str = "intervals.json";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub editor: EditorConfig,
    /// Overrides the default location of the interval book.
    pub data_file: Option<PathBuf>,
    /// Title offered when starting a timer.
    pub last_timer_title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            data_file: None,
            last_timer_title: String::new(),
        }
    }
}

impl AppSettings {
    /// Read settings, falling back to defaults when missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|json| serde_json::from_str::<Self>(&json).map_err(anyhow::Error::from))
        {
            Ok(mut settings) => {
                let reset = settings.editor.sanitize();
                if !reset.is_empty() {
                    warn!("settings {}: invalid {}, using defaults for them", path.display(), reset.join(", "));
                }
                settings
            }
            Err(e) => {
                warn!("failed to read settings {}: {e:#}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// The interval book location, honouring `data_file`.
    pub fn book_path(&self, paths: &AppPaths) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| paths.data_dir.join(BOOK_FILE))
    }
}

/// Where settings and data are kept.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub settings_path: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Self {
        match directories::ProjectDirs::from("com", "timetrack", "RustTimetrackApp") {
            Some(dirs) => Self {
                settings_path: dirs.config_dir().join(SETTINGS_FILE),
                data_dir: dirs.data_dir().to_path_buf(),
            },
            None => {
                warn!("no home directory found, keeping data next to the executable");
                Self {
                    settings_path: PathBuf::from(SETTINGS_FILE),
                    data_dir: PathBuf::from("."),
                }
            }
        }
    }
}
