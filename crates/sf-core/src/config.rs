//! Configuration types and parsing for starforge.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "starforge.yml";

/// Main project configuration from starforge.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Warehouse database configuration
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Directories containing source extracts (CSV files)
    #[serde(default = "default_source_paths")]
    pub source_paths: Vec<String>,

    /// Rows per INSERT batch during load
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Database file path, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_db_path() -> String {
    "warehouse.duckdb".to_string()
}

fn default_source_paths() -> Vec<String> {
    vec!["sources".to_string()]
}

fn default_batch_size() -> usize {
    500
}

impl Config {
    /// Load configuration from a project directory
    pub fn load(project_dir: &Path) -> CoreResult<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "project name must not be empty".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "batch_size must be positive".to_string(),
            });
        }
        if self.source_paths.is_empty() {
            log::warn!("No source directories configured; file-backed extracts will fail");
        }
        Ok(())
    }

    /// Source directories resolved against the project root
    pub fn source_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.source_paths.iter().map(|p| root.join(p)).collect()
    }
}
