use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::console::BackgroundMerge;
use crate::error::ColourError;
use crate::handler::{ColourMode, HandlerOptions};
use crate::log_parser::{ColourName, Level, StyleOverrides, StyleTriple};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: ColourMode,
    pub show_level: bool,
    pub min_level: Level,
    pub background_merge: BackgroundMerge,
    #[serde(skip_serializing_if = "StyleOverrides::is_empty")]
    pub styles: StyleOverrides,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ColourMode::Auto,
            show_level: true,
            min_level: Level::Debug,
            background_merge: BackgroundMerge::Replace,
            styles: StyleOverrides::default(),
        }
    }
}

impl Config {
    /// Get the config file path (~/.config/colourlog/config.yaml)
    pub fn config_path() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("HOME") {
            let mut path = PathBuf::from(home);
            path.push(".config");
            path.push("colourlog");
            path.push("config.yaml");
            Some(path)
        } else {
            None
        }
    }

    /// Load config from the default path, or fall back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`; a missing or broken file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<(), ColourError> {
        let path = Self::config_path()
            .ok_or_else(|| ColourError::Config("Could not determine config path".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ColourError> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ColourError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| ColourError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, yaml)
            .map_err(|e| ColourError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// An example config showing every option
    pub fn example() -> Self {
        Config {
            mode: ColourMode::Auto,
            show_level: true,
            min_level: Level::Info,
            background_merge: BackgroundMerge::Replace,
            styles: StyleOverrides {
                info: Some(StyleTriple::new(None, Some(ColourName::Green), false)),
                critical: Some(StyleTriple::new(Some(ColourName::Magenta), Some(ColourName::White), true)),
                ..Default::default()
            },
        }
    }

    /// Write the example config to `path`, or the default path
    pub fn create_example(path: Option<&Path>) -> Result<(), ColourError> {
        match path {
            Some(path) => Self::example().save_to(path),
            None => Self::example().save(),
        }
    }

    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            mode: self.mode,
            background_merge: self.background_merge,
            show_level: self.show_level,
            min_level: self.min_level,
            styles: self.styles.clone(),
            ..Default::default()
        }
    }
}
