//! Configuration management for TurboPech
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TurboPechError};
use crate::model_config::GenerationParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for TurboPech
///
/// Holds the backend connection settings, where conversations are stored,
/// view tuning (history page size, stats polling), and the generation
/// parameters the model store starts with.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Inference backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Conversation storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// History view settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// System statistics view settings
    #[serde(default)]
    pub stats: StatsConfig,

    /// Startup generation parameters (kept in memory only once running)
    #[serde(default)]
    pub generation: GenerationParameters,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the server exposing the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix placed before every endpoint (`/api` behind the dev proxy,
    /// empty when talking to the inference server directly)
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds; model loading can be slow
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl BackendConfig {
    /// Build the full URL for an endpoint such as `status` or `chat`
    ///
    /// # Examples
    ///
    /// ```
    /// use turbopech::config::BackendConfig;
    ///
    /// let config = BackendConfig::default();
    /// assert_eq!(config.endpoint("status"), "http://localhost:3000/api/status");
    /// ```
    pub fn endpoint(&self, name: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", base, name)
        } else {
            format!("{}/{}/{}", base, prefix, name)
        }
    }
}

/// Conversation storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Explicit database path; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// History view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of conversations per page in `history list`
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    6
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// System statistics view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Polling interval for `stats --watch`
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

fn default_poll_interval_seconds() -> u64 {
    30
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TurboPechError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TurboPechError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("TURBOPECH_BACKEND_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(prefix) = std::env::var("TURBOPECH_API_PREFIX") {
            self.backend.api_prefix = prefix;
        }

        if let Ok(timeout) = std::env::var("TURBOPECH_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.backend.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid TURBOPECH_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(db_path) = std::env::var("TURBOPECH_HISTORY_DB") {
            self.storage.path = Some(db_path);
        }

        if let Ok(page_size) = std::env::var("TURBOPECH_PAGE_SIZE") {
            if let Ok(value) = page_size.parse() {
                self.history.page_size = value;
            } else {
                tracing::warn!("Invalid TURBOPECH_PAGE_SIZE: {}", page_size);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(url) = &cli.backend_url {
            tracing::info!("Using backend URL override from CLI: {}", url);
            self.backend.base_url = url.clone();
        }

        if let Some(db_path) = &cli.storage_path {
            tracing::info!("Using storage DB override from CLI: {}", db_path);
            self.storage.path = Some(db_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Ensures the backend URL parses, intervals and sizes are non-zero, and
    /// the startup generation parameters sit inside the ranges the input
    /// widgets allow.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.backend.base_url).map_err(|e| {
            TurboPechError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TurboPechError::Config(format!(
                "backend.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(TurboPechError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.history.page_size == 0 {
            return Err(TurboPechError::Config(
                "history.page_size must be greater than 0".to_string(),
            )
            .into());
        }

        if self.stats.poll_interval_seconds == 0 {
            return Err(TurboPechError::Config(
                "stats.poll_interval_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        self.generation
            .check_ranges()
            .map_err(|e| TurboPechError::Config(format!("generation: {}", e)))?;

        Ok(())
    }
}
