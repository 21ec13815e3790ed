//! Configuration management.

mod file_config;

pub use file_config::{
    ApiConfig, CacheConfig, ConfigFile, ConfigFileError, ExportConfig, LoggingConfig,
    RateLimitConfig, StorageConfig,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration assembled from file, environment and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API credential
    #[serde(default)]
    pub api: ApiConfig,

    /// Courtesy delays between requests
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Durable storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                key: std::env::var("SCOPUS_API_KEY").ok(),
            },
            rate_limits: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Load configuration from a file, with `SCOPUS_SCOUT_*` environment
/// variables layered on top.
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .add_source(config::Environment::with_prefix("SCOPUS_SCOUT").separator("__"))
        .build()?;

    let mut loaded: Config = settings.try_deserialize()?;

    // The bare env var always wins over the file for the credential.
    if let Ok(key) = std::env::var("SCOPUS_API_KEY") {
        loaded.api.key = Some(key);
    }

    Ok(loaded)
}

/// Get the default configuration (env vars and defaults only).
pub fn get_config() -> Config {
    Config::default()
}

/// Look for a config file in the default locations.
///
/// Checked in order: `./scopus-scout.toml`, then
/// `<config dir>/scopus-scout/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("scopus-scout.toml");
    if local.is_file() {
        return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join("scopus-scout").join("config.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    None
}

/// Default cache root directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("scopus-scout"))
        .unwrap_or_else(|| PathBuf::from(".cache/scopus-scout"))
}
