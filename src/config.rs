//! Configuration management for hourlog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging settings
///
/// Every field is optional in the config file and falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Alias path; bucket files are written next to it as
    /// `<save_path>.<YYYY-MM-DD-HH>.log`. A `___` marker is stripped and a
    /// leading `~` is expanded.
    #[serde(default = "default_save_path")]
    pub save_path: String,

    /// Minimum level: trace, debug, info, warn, error or panic (default: info)
    #[serde(default = "default_level")]
    pub level: String,

    /// Days to keep bucket files; 0 keeps them forever (default: 7)
    #[serde(default = "default_save_days")]
    pub save_days: u32,

    /// Hours per bucket (default: 1)
    #[serde(default = "default_rotation_hours")]
    pub rotation_hours: u32,

    /// Output: "console" (default), "file" or "all"
    #[serde(default = "default_output_type")]
    pub output_type: String,
}

fn default_save_path() -> String {
    logs_dir().join("hourlog").to_string_lossy().into_owned()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_save_days() -> u32 {
    7
}

fn default_rotation_hours() -> u32 {
    1
}

fn default_output_type() -> String {
    "console".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            level: default_level(),
            save_days: default_save_days(),
            rotation_hours: default_rotation_hours(),
            output_type: default_output_type(),
        }
    }
}

impl Settings {
    /// Load settings from the default config file, or defaults if it does not exist
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load settings from `path`, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save path with a leading `~` expanded
    pub fn expanded_save_path(&self) -> String {
        shellexpand::tilde(&self.save_path).into_owned()
    }
}

/// Get the base configuration directory (~/.hourlog)
/// Falls back to ./.hourlog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".hourlog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".hourlog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the default logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}
