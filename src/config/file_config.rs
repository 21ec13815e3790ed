//! Configuration file support.
//!
//! TOML configuration with environment variable overrides layered on top
//! by [`super::load_config`].
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! key = "your-elsevier-api-key"
//!
//! [rate_limits]
//! page_delay_ms = 1000
//! abstract_delay_ms = 500
//!
//! [cache]
//! enabled = true
//! directory = "~/.cache/scopus-scout"
//! search_ttl_seconds = 3600
//! abstract_ttl_seconds = 3600
//!
//! [storage]
//! database_path = "scopus_documents.db"
//!
//! [export]
//! directory = "."
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration file structure
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// API credential section
    #[serde(default)]
    pub api: ApiConfig,

    /// Rate limit section
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Cache section
    #[serde(default)]
    pub cache: CacheConfig,

    /// Storage section
    #[serde(default)]
    pub storage: StorageConfig,

    /// Export section
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging section
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API credential configuration
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Elsevier API key; `SCOPUS_API_KEY` overrides this
    #[serde(default)]
    pub key: Option<String>,
}

/// Courtesy delay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Pause between consecutive search page requests
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Pause after each successful abstract retrieval
    #[serde(default = "default_abstract_delay_ms")]
    pub abstract_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            abstract_delay_ms: default_abstract_delay_ms(),
        }
    }
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_abstract_delay_ms() -> u64 {
    500
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default = "default_ttl")]
    pub search_ttl_seconds: u64,

    #[serde(default = "default_ttl")]
    pub abstract_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            search_ttl_seconds: default_ttl(),
            abstract_ttl_seconds: default_ttl(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u64 {
    3600 // 1 hour
}

/// Durable storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from(crate::sink::DEFAULT_DB_PATH)
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory CSV files are written into
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &PathBuf) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &PathBuf) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
