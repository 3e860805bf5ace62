//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_NAME, DEFAULT_ROOM_COLOR};
use crate::models::RoomColor;

/// Record store the editor persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-process store; nothing leaves the machine
    #[default]
    Memory,
    /// Remote REST endpoint
    Rest,
}

/// Remote record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Which store to use
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the REST endpoint (e.g., "`https://project.example/rest/v1`")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds; unset means requests may hang forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Completed remote writes kept in the dispatch history (default 50)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

/// GeoJSON export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to
    pub output_dir: PathBuf,
    /// Prefix of every exported file name
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    "floorplan".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        // Use config directory for exports by default
        let output_dir = Config::config_dir()
            .map(|dir| dir.join("exports"))
            .unwrap_or_else(|_| PathBuf::from("exports"));

        Self {
            output_dir,
            file_prefix: default_file_prefix(),
        }
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Color shown for rooms that have none stored
    #[serde(default = "default_room_color")]
    pub default_room_color: String,
}

fn default_room_color() -> String {
    DEFAULT_ROOM_COLOR.to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_room_color: default_room_color(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/FloorplanEditor/config.toml`
/// - macOS: `~/Library/Application Support/FloorplanEditor/config.toml`
/// - Windows: `%APPDATA%\FloorplanEditor\config.toml`
///
/// # Validation
///
/// - `store.url` is required for the REST backend and must be an http(s) URL
/// - `ui.default_room_color` must be a `#rrggbb` color
/// - `export.file_prefix` must be non-empty and free of path separators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Record store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/FloorplanEditor/`
    /// - macOS: `~/Library/Application Support/FloorplanEditor/`
    /// - Windows: `%APPDATA%\FloorplanEditor\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the platform config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the platform config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to a specific file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp config file to: {}", path.display()))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.store.backend == StoreBackend::Rest {
            let url = self
                .store
                .url
                .as_deref()
                .context("store.url is required when store.backend = \"rest\"")?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("store.url must start with http:// or https://, got '{url}'");
            }
        }

        if self.store.history_limit == Some(0) {
            anyhow::bail!("store.history_limit must be at least 1");
        }

        RoomColor::from_hex(&self.ui.default_room_color)
            .context("ui.default_room_color is not a valid color")?;

        let prefix = &self.export.file_prefix;
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            anyhow::bail!("export.file_prefix must be non-empty and contain no path separators");
        }

        Ok(())
    }

    /// Points the store at a REST endpoint.
    pub fn set_store_url(&mut self, url: impl Into<String>) -> Result<()> {
        self.store.backend = StoreBackend::Rest;
        self.store.url = Some(url.into());
        self.validate()
    }
}
