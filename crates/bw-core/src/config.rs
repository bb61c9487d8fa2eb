//! Debugger configuration
//!
//! Stored as TOML under the platform configuration directory
//! (`<config_dir>/bankwise/config.toml`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Logging and diagnostics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log verbosity
    pub log_level: LogLevel,
    /// Mirror log output to `log_path`
    pub log_to_file: bool,
    /// Log file location
    pub log_path: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            log_path: PathBuf::from("bankwise.log"),
        }
    }
}

/// Workspace persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding one workspace file per program
    pub directory: PathBuf,
    /// Save the workspace whenever the loaded program changes
    pub autosave: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        let directory = dirs::data_dir()
            .map(|d| d.join("bankwise").join("workspaces"))
            .unwrap_or_else(|| PathBuf::from("workspaces"));
        Self {
            directory,
            autosave: true,
        }
    }
}

impl WorkspaceConfig {
    /// Workspace file for the given program name
    pub fn path_for(&self, program_name: &str) -> PathBuf {
        let file: String = program_name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        self.directory.join(format!("{file}.json"))
    }
}

/// Memory tools view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryToolsConfig {
    /// Name of the last viewed memory type
    pub memory_type: Option<String>,
    /// Bytes shown per hex row
    pub bytes_per_row: u32,
}

impl Default for MemoryToolsConfig {
    fn default() -> Self {
        Self {
            memory_type: None,
            bytes_per_row: 16,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: DebugConfig,
    pub workspace: WorkspaceConfig,
    pub memory_tools: MemoryToolsConfig,
}

impl Config {
    /// Default config file location
    pub fn path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("bankwise").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the configuration, falling back to defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_toml(&std::fs::read_to_string(&path)?)
    }

    /// Save the configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_toml()?)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Serialize configuration to TOML text
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
