//! Config persistence and path resolution for `Config`.
//!
//! Covers:
//! - `load` / `save` (YAML file I/O with atomic write)
//! - `load_from` / `save_to` for explicit paths
//! - XDG-style path helpers (`config_path`, `config_dir`)

use crate::config::Config;
use crate::error::ConfigError;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from the default path, creating it if missing.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save() {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            log::info!("Default config created successfully");
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let config: Config = serde_yaml_ng::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = config_path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, config_path).map_err(ConfigError::from)?;

        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("par-annotate")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // ~/.config/par-annotate on every unix, macOS included
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("par-annotate")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
