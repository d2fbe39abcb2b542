//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::dashboard::{default_panels, validate_panels, Panel, PanelError, DEFAULT_TOP_N};
use crate::schema::AliasTable;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid panels: {0}")]
    Panels(#[from] PanelError),
}

/// Input table locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Match table, relative to `data_dir` unless absolute.
    #[serde(default = "default_matches")]
    pub matches: PathBuf,

    /// Delivery table, relative to `data_dir` unless absolute.
    #[serde(default = "default_events")]
    pub events: PathBuf,
}

fn default_matches() -> PathBuf {
    PathBuf::from("matches.csv")
}

fn default_events() -> PathBuf {
    PathBuf::from("deliveries.csv")
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            matches: default_matches(),
            events: default_events(),
        }
    }
}

/// Extra source column names, keyed by canonical column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Row limit for ad hoc queries.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub server: ServerConfig,

    /// Replaces the default dashboard when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panels: Option<Vec<Panel>>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_limit() -> usize {
    DEFAULT_TOP_N
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            default_limit: default_limit(),
            dataset: DatasetConfig::default(),
            schema: SchemaConfig::default(),
            server: ServerConfig::default(),
            panels: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if the file exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.dataset.matches.as_os_str().is_empty() || self.dataset.events.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Dataset paths must not be empty".to_string(),
            ));
        }

        for (column, aliases) in &self.schema.aliases {
            if !AliasTable::is_canonical(column) {
                return Err(ConfigError::ValidationError(format!(
                    "Unknown canonical column in schema.aliases: {}",
                    column
                )));
            }
            if aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "Empty alias for column {}",
                    column
                )));
            }
        }

        if let Some(panels) = &self.panels {
            validate_panels(panels)?;
        }

        Ok(())
    }

    pub fn matches_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset.matches)
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset.events)
    }

    /// Default aliases plus the configured extras.
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::default().with_extra(&self.schema.aliases)
    }

    /// Configured panels, or the default dashboard.
    pub fn panels(&self) -> Vec<Panel> {
        self.panels.clone().unwrap_or_else(default_panels)
    }
}
