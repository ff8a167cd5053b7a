// File: src/paths.rs
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const TEST_DIR_VAR: &str = "CALSIFT_TEST_DIR";

pub struct AppPaths;

impl AppPaths {
    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "calsift", "calsift")
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }

    /// Test override first, then the standard OS location.
    fn resolve_base(subdir: &str) -> Option<PathBuf> {
        if let Ok(test_dir) = env::var(TEST_DIR_VAR) {
            return Some(PathBuf::from(test_dir));
        }

        let proj = Self::get_proj_dirs()?;
        let dir = match subdir {
            "data" => proj.data_dir(),
            "config" => proj.config_dir(),
            _ => return None,
        };
        Some(dir.to_path_buf())
    }

    pub fn get_data_dir() -> Result<PathBuf> {
        let path = Self::resolve_base("data")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::ensure_exists(path)
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let path = Self::resolve_base("config")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::ensure_exists(path)
    }

    pub fn get_config_file_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    /// Default location of the normalized events file.
    pub fn get_events_path() -> Result<PathBuf> {
        Ok(Self::get_data_dir()?.join("events.json"))
    }
}
