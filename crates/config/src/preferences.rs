// Grid preferences
// Loaded from ~/.config/trellis/settings.json

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// How a collection is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Grid with one row per record (default)
    #[default]
    Table,
    /// Compact list, primary field only
    List,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Visible column keys per collection, in display order.
    /// Absent collections show every configured column.
    #[serde(rename = "grid.visibleColumns")]
    pub visible_columns: HashMap<String, Vec<String>>,

    #[serde(rename = "grid.pageSize")]
    pub page_size: usize,

    #[serde(rename = "ui.viewMode")]
    pub view_mode: ViewMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            visible_columns: HashMap::new(),
            page_size: 50,
            view_mode: ViewMode::Table,
        }
    }
}

impl Preferences {
    /// Get the preferences file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trellis");
        config_dir.join("settings.json")
    }

    /// Load preferences from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path (used by tests)
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(prefs) => prefs,
                    Err(e) => {
                        eprintln!("Error parsing settings.json: {}", e);
                        eprintln!("Using default preferences");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                eprintln!("Error reading settings.json: {}", e);
                Self::default()
            }
        }
    }

    /// Save current preferences to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    /// Save to an explicit path (used by tests)
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Columns to show for one collection, or `None` for "show everything".
    pub fn columns_for(&self, collection: &str) -> Option<&[String]> {
        self.visible_columns.get(collection).map(|v| v.as_slice())
    }
}
