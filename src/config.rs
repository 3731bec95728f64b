//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; the
//! binary applies its command-line flags on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::state::DEFAULT_MAX_BODY_SIZE;
use crate::api::ApiConfig;
use crate::loader;
use crate::store;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub loader: LoaderSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub access_log: bool,

    #[serde(default = "default_rps_watcher")]
    pub rps_watcher: bool,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_rps_watcher() -> bool {
    true
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            access_log: false,
            rps_watcher: default_rps_watcher(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Startup data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_archive")]
    pub archive: PathBuf,
}

fn default_archive() -> PathBuf {
    PathBuf::from("/tmp/data/data.zip")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            archive: default_archive(),
        }
    }
}

/// Archive loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSection {
    #[serde(default = "loader::default_workers")]
    pub max_workers: usize,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            max_workers: loader::default_workers(),
        }
    }
}

/// Entity store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_shards")]
    pub shards: usize,
}

fn default_shards() -> usize {
    store::StoreConfig::default().shards
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            shards: default_shards(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First existing config file among the default locations
    pub fn find_default() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("travels").join("config.toml")),
            Some(PathBuf::from("/etc/travels/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];
        first_existing(config_paths.into_iter().flatten())
    }

    /// Load from the first default location, or from the environment alone
    ///
    /// Returns the file used, if any. A file that exists but does not parse
    /// is an error.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::find_default() {
            Some(path) => Ok((Self::load_with_env(&path)?, Some(path))),
            None => Ok((Self::from_env(), None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("TRAVELS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("TRAVELS_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(archive) = var("TRAVELS_ARCHIVE") {
            self.data.archive = PathBuf::from(archive);
        }

        if let Some(shards) = var("TRAVELS_SHARDS").and_then(|s| s.parse().ok()) {
            self.store.shards = shards;
        }

        if let Some(level) = var("TRAVELS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TRAVELS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values no component can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.shards == 0 {
            return Err(ConfigError::Invalid("store.shards must be at least 1".into()));
        }
        if self.loader.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "loader.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            access_log: self.server.access_log,
            rps_watcher: self.server.rps_watcher,
            max_body_size: self.server.max_body_size,
        }
    }

    pub fn loader_config(&self) -> loader::LoaderConfig {
        loader::LoaderConfig {
            archive: self.data.archive.clone(),
            max_workers: self.loader.max_workers,
        }
    }

    pub fn store_config(&self) -> store::StoreConfig {
        store::StoreConfig::new(self.store.shards)
    }
}

fn first_existing(paths: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|path| path.exists())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Travels Configuration
#
# Environment variables override these settings:
# - TRAVELS_HOST
# - TRAVELS_PORT
# - TRAVELS_ARCHIVE
# - TRAVELS_SHARDS
# - TRAVELS_LOG_LEVEL
# - TRAVELS_LOG_FORMAT

[server]
# Address to listen on
host = "0.0.0.0"
port = 80

# Log every request
access_log = false

# Log requests served per second
rps_watcher = true

# Largest accepted request body (bytes)
max_body_size = 67108864

[data]
# ZIP archive loaded at startup
archive = "/tmp/data/data.zip"

[loader]
# Archive entries decoded concurrently (defaults to the CPU count)
# max_workers = 8

[store]
# Lock shards per entity kind
shards = 64

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
