//! User settings stored as `settings.toml`
//!
//! Every field has a default, so older or hand-edited files with missing
//! keys still load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use super::store::{write_atomic, FileStore};
use crate::split::ComparisonMode;
use crate::timer::DEFAULT_TICK_INTERVAL;
use crate::Result;

const SETTINGS_FILE: &str = "settings.toml";

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub always_on_top: bool,
    /// Comparison used for live deltas
    pub comparison: ComparisonMode,
    /// Tick period of the background sampler
    pub tick_interval_ms: u64,
    pub hotkeys: HotkeyBindings,
    pub colors: ColorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            always_on_top: false,
            comparison: ComparisonMode::PersonalBest,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            hotkeys: HotkeyBindings::default(),
            colors: ColorSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Sampler period, never below one millisecond
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Key codes bound to each timer action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyBindings {
    pub start_split: String,
    pub pause: String,
    pub reset: String,
    pub undo_split: String,
    pub skip_split: String,
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            start_split: "Space".into(),
            pause: "KeyP".into(),
            reset: "KeyR".into(),
            undo_split: "Backspace".into(),
            skip_split: "KeyS".into(),
        }
    }
}

/// Hex colours for delta display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    pub ahead_gaining: String,
    pub ahead_losing: String,
    pub behind_gaining: String,
    pub behind_losing: String,
    pub best_segment: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            ahead_gaining: "#30d158".into(),
            ahead_losing: "#7ec890".into(),
            behind_gaining: "#cc6b65".into(),
            behind_losing: "#ff453a".into(),
            best_segment: "#ffd60a".into(),
        }
    }
}

// =============================================================================
// STORE INTEGRATION
// =============================================================================

impl FileStore {
    /// Load settings, falling back to defaults when the file is missing
    pub fn load_settings(&self) -> Result<Settings> {
        let text = match fs::read_to_string(self.file_path(SETTINGS_FILE)) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        Settings::from_toml_str(&text)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let text = settings.to_toml_string()?;
        write_atomic(&self.file_path(SETTINGS_FILE), text.as_bytes())?;
        log::debug!("Saved settings");
        Ok(())
    }
}
