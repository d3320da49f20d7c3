use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::WorkInterval;

/// Everything the tracker stores on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalBook {
    #[serde(default)]
    pub intervals: Vec<WorkInterval>,
}

/// Save the interval book to a JSON file.
pub fn save_book(book: &IntervalBook, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(book)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Load the interval book from a JSON file.
pub fn load_book(path: &Path) -> Result<IntervalBook> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}
