//! Game settings and preferences
//!
//! Stored as `settings.json` in the data directory, separate from player
//! records. Unknown or missing keys take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TICK_HZ;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where player records, the weapon catalog and exports live (the
    /// directory the settings were loaded from)
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Logical simulation rate
    pub tick_hz: u32,

    /// Fire automatically whenever the weapon is ready
    pub auto_fire: bool,

    /// Scripted ticks the headless driver plays per run
    pub demo_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("alien_war_data"),
            tick_hz: TICK_HZ,
            auto_fire: true,
            demo_ticks: 60 * TICK_HZ,
        }
    }
}

impl Settings {
    /// Player record file
    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join("players.json")
    }

    /// Weapon catalog file
    pub fn weapons_path(&self) -> PathBuf {
        self.data_dir.join("weapons.json")
    }

    /// Milliseconds per simulation tick
    pub fn tick_interval_ms(&self) -> f64 {
        1000.0 / self.tick_hz.clamp(1, 1000) as f64
    }

    /// Load settings from `dir`, falling back to defaults (with `data_dir = dir`)
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        let settings = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        Self {
            data_dir: dir.to_path_buf(),
            ..settings
        }
    }

    /// Save settings into the data directory
    pub fn save(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        crate::persistence::write_atomic(&self.data_dir.join(SETTINGS_FILE), json.as_bytes())?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.tick_hz, 60);
        assert!(settings.auto_fire);
        assert_eq!(settings.data_dir, dir.path());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{"auto_fire": false}"#).unwrap();
        let settings = Settings::load(dir.path());
        assert!(!settings.auto_fire);
        assert_eq!(settings.tick_hz, 60);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            tick_hz: 120,
            ..Default::default()
        };
        settings.save().unwrap();
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn test_tick_interval() {
        let settings = Settings::default();
        assert!((settings.tick_interval_ms() - 16.666).abs() < 0.01);
    }
}
