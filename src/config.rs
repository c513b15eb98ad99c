//! Configuration loading and management
//!
//! Handles parsing of `.repcheck.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Task tracker endpoint configuration
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Reconciliation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Line parsing configuration
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Export row labels
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            validation: ValidationConfig::default(),
            parsing: ParsingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Task tracker endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Work-package endpoint; the task id is appended as a path segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the session cookie
    #[serde(default = "default_cookie_env")]
    pub cookie_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://track.example/api/v3/work_packages".to_string()
}

fn default_cookie_env() -> String {
    "REPCHECK_COOKIE".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_env: default_cookie_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Statuses a reported task may be in
    #[serde(default = "default_allowed_statuses")]
    pub allowed_statuses: Vec<String>,

    /// Expected responsible name on every task
    #[serde(default)]
    pub handler: String,

    /// Require the positive estimate annotation in the description
    #[serde(default = "default_true")]
    pub require_description_hours: bool,
}

fn default_allowed_statuses() -> Vec<String> {
    vec!["已完成".to_string(), "已关闭".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_statuses: default_allowed_statuses(),
            handler: String::new(),
            require_description_hours: true,
        }
    }
}

/// Line parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Remove every space inside a line before matching
    #[serde(default = "default_true")]
    pub strip_spaces: bool,

    /// Keep only lines containing the handler name
    #[serde(default)]
    pub filter_by_handler: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            strip_spaces: true,
            filter_by_handler: false,
        }
    }
}

/// Export row labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Fixed status label written to every export row
    #[serde(default = "default_status_label")]
    pub status_label: String,

    /// Fixed priority label written to every export row
    #[serde(default = "default_priority_label")]
    pub priority_label: String,
}

fn default_status_label() -> String {
    "已完成".to_string()
}

fn default_priority_label() -> String {
    "中".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            status_label: default_status_label(),
            priority_label: default_priority_label(),
        }
    }
}

pub const CONFIG_FILE: &str = ".repcheck.toml";

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.repcheck.toml` from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.tracker.base_url.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tracker.base_url cannot be empty".to_string(),
            ));
        }
        if self.tracker.timeout_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "tracker.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.validation.allowed_statuses.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "validation.allowed_statuses cannot be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for status in &self.validation.allowed_statuses {
            let trimmed = status.trim();
            if trimmed.is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "validation.allowed_statuses cannot include empty entries".to_string(),
                ));
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "validation.allowed_statuses has duplicate entry '{trimmed}'"
                )));
            }
        }

        Ok(())
    }
}
