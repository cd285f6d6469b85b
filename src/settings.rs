//! Game settings and preferences
//!
//! Persisted as JSON next to the profiles file. Missing or malformed files
//! fall back to defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TICK_RATE;
use crate::sim::input::{KeyCode, Keyboard};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings could not be encoded: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Simulation ===
    /// Ticks per second
    pub tick_rate: u32,

    // === Input ===
    /// Binding name → key code, applied over the built-in bindings
    pub key_bindings: BTreeMap<String, KeyCode>,

    // === Content ===
    /// Level index to start from
    pub start_level: usize,
    /// Directory of `level<N>.json` files; the built-in demo level when unset
    pub levels_dir: Option<PathBuf>,

    // === Profiles ===
    pub profiles_path: PathBuf,
    pub profile_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            key_bindings: BTreeMap::new(),
            start_level: 0,
            levels_dir: None,
            profiles_path: PathBuf::from("profiles.json"),
            profile_name: "player".to_string(),
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {})", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Default bindings with the configured overrides applied
    pub fn keyboard(&self) -> Keyboard {
        let mut keyboard = Keyboard::with_default_bindings();
        for (name, &key) in &self.key_bindings {
            keyboard.register_binding(name, key);
        }
        keyboard
    }

    /// Fixed tick interval (a zero rate is treated as 1)
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{bindings, keys};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("galactic-settings-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_default_tick_interval() {
        let settings = Settings::default();
        assert_eq!(settings.tick_rate, 30);
        assert_eq!(settings.tick_interval(), Duration::from_nanos(33_333_333));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        assert_eq!(Settings::load(temp_path("missing")), Settings::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ nope").expect("write");
        assert_eq!(Settings::load(&path), Settings::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{"tick_rate": 60}"#).expect("write");
        let settings = Settings::load(&path);
        assert_eq!(settings.tick_rate, 60);
        assert_eq!(settings.profile_name, "player");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_path("roundtrip");
        let mut settings = Settings::default();
        settings.start_level = 2;
        settings.key_bindings.insert(bindings::JUMP.to_string(), keys::UP);
        settings.save(&path).expect("save");
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_binding_overrides() {
        let mut settings = Settings::default();
        settings.key_bindings.insert(bindings::JUMP.to_string(), keys::UP);
        let keyboard = settings.keyboard();
        assert_eq!(keyboard.binding(bindings::JUMP), Some(keys::UP));
        assert_eq!(keyboard.binding(bindings::MOVE_LEFT), Some(keys::LEFT));
    }
}
