use crate::error::SettingsError;
use crate::physics::PhysicsSettings;
use crate::rendering::RenderSettings;
use crate::theme::{Theme, ThemeSheet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    /// Initial inner size in logical pixels
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Backdrop".to_string(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Application settings, read from `settings.toml` when present
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub window: WindowSettings,
    /// Set to false to run without the particle surface
    pub enabled: bool,
    /// Stored theme preference; follows the system scheme when unset
    pub theme: Option<Theme>,
    /// Initial reduced-motion preference
    pub reduced_motion: bool,
    /// Forget the pointer when it leaves the window
    pub clear_pointer_on_leave: bool,
    /// Show the frame rate in the window title
    pub show_fps: bool,
    /// Seed for reproducible particle layouts
    pub seed: Option<u64>,
    pub physics: PhysicsSettings,
    pub render: RenderSettings,
    pub themes: ThemeSheet,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            enabled: true,
            theme: None,
            reduced_motion: false,
            clear_pointer_on_leave: false,
            show_fps: false,
            seed: None,
            physics: PhysicsSettings::default(),
            render: RenderSettings::default(),
            themes: ThemeSheet::default(),
        }
    }
}

impl AppSettings {
    const SETTINGS_FILE: &'static str = "settings.toml";

    /// Loads settings from the settings file, or returns default settings if the file doesn't exist
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(Path::new(Self::SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        let settings: AppSettings = toml::from_str(contents)?;
        Ok(settings)
    }
}
