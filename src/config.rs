// File: src/config.rs
use crate::engine::default_pattern_badges;
use crate::model::{Band, PatternBadge, ViewMode};
use crate::paths::AppPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CALENDAR_ID: &str = "music";
pub const DEFAULT_CALENDAR_NAME: &str = "Federales";

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Normalized events file; `<data dir>/events.json` when unset.
    #[serde(default)]
    pub events_file: Option<PathBuf>,

    /// Calendar assigned to every converted event.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default)]
    pub view_mode: ViewMode,

    // None switches every badge on.
    #[serde(default)]
    pub visible_patterns: Option<Vec<usize>>,
    #[serde(default)]
    pub visible_bands: Vec<usize>,

    #[serde(default)]
    pub hidden_calendars: Vec<String>,

    // Tables last so the TOML output stays valid.
    #[serde(default = "default_pattern_badges")]
    pub pattern_badges: Vec<PatternBadge>,
    #[serde(default)]
    pub bands: Vec<Band>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events_file: None,
            calendar_id: default_calendar_id(),
            calendar_name: default_calendar_name(),
            view_mode: ViewMode::default(),
            pattern_badges: default_pattern_badges(),
            visible_patterns: None,
            bands: Vec::new(),
            visible_bands: Vec::new(),
            hidden_calendars: Vec::new(),
        }
    }
}

impl Config {
    fn get_path() -> Result<PathBuf> {
        AppPaths::get_config_file_path()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {:?}", path));
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config: {:?}", path))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }

    /// Configured events file, or the default one in the data directory.
    pub fn events_path(&self) -> Result<PathBuf> {
        match &self.events_file {
            Some(path) => Ok(path.clone()),
            None => AppPaths::get_events_path(),
        }
    }
}
