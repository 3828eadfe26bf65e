//! Configuration handling for formkeep
//!
//! Configuration is stored in `formkeep.toml` at the project root and
//! `~/.config/formkeep/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportFormat;

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "formkeep.toml";

/// Default number of entries per page when listing
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding form and entry files, relative to the project root
    pub forms_dir: String,

    /// Entries per page for `entry list`
    pub page_size: Option<usize>,

    /// Format used by `export` when none is given
    pub default_export: ExportFormat,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            forms_dir: "Forms".to_string(),
            page_size: None,
            default_export: ExportFormat::Csv,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Entries per page when the project does not set one
    pub page_size: Option<usize>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        let config = Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "formkeep", "formkeep")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    fn validate(&self) -> Result<()> {
        if self.project.forms_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("forms_dir cannot be empty".to_string()).into());
        }
        if self.page_size() == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()).into());
        }
        Ok(())
    }

    /// Finds the project root by looking for `formkeep.toml` or `Forms/`
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(PROJECT_CONFIG_FILE).is_file() || current.join("Forms").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Entries per page: project setting, then global, then the default
    pub fn page_size(&self) -> usize {
        self.project
            .page_size
            .or(self.global.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
