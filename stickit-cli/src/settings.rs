//! Application settings persistence for StickIt.
//!
//! Stores user preferences (where the notes live, how large the board is) in a
//! JSON file at an OS-appropriate location.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stickit_core::Viewport;

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// SQLite file holding the notes.
    pub store_path: String,
    /// Board width used for clamping moves and resizes.
    pub board_width: f64,
    pub board_height: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            store_path: default_store_path().to_string_lossy().to_string(),
            board_width: viewport.width,
            board_height: viewport.height,
        }
    }
}

impl AppSettings {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.board_width, self.board_height)
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/stickit/settings.json`
/// - Windows: `%APPDATA%/StickIt/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("StickIt").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("stickit").join("settings.json")
    }
}

/// Returns the default notes file: `<data dir>/stickit/notes.sqlite`.
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("stickit")
        .join("notes.sqlite")
}

/// Loads settings from disk; returns defaults if the file is missing or corrupt.
pub fn load_settings() -> AppSettings {
    load_settings_from(&settings_file_path())
}

pub fn load_settings_from(path: &Path) -> AppSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring corrupt settings file {}: {e}", path.display());
            AppSettings::default()
        }),
        Err(_) => AppSettings::default(),
    }
}

/// Saves settings to disk, creating parent directories as needed.
pub fn save_settings(settings: &AppSettings) -> stickit_core::Result<()> {
    save_settings_to(&settings_file_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> stickit_core::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings_from(&dir.path().join("settings.json"));
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.board_width, 1280.0);
        assert_eq!(settings.board_height, 800.0);
        assert!(settings.store_path.ends_with("notes.sqlite"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            store_path: "/tmp/board.sqlite".to_string(),
            board_width: 1920.0,
            board_height: 1080.0,
        };
        save_settings_to(&path, &settings).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"storePath\""));
        assert!(json.contains("\"boardWidth\""));
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), AppSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"boardWidth": 640}"#).unwrap();

        let settings = load_settings_from(&path);
        assert_eq!(settings.board_width, 640.0);
        assert_eq!(settings.board_height, 800.0);
        assert_eq!(settings.viewport(), Viewport::new(640.0, 800.0));
    }
}
