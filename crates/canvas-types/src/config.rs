//! Configuration loading for MindCanvas.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/mindcanvas/config.{toml,json,yaml}.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CanvasError;

const APP_NAME: &str = "mindcanvas";
const ENV_PREFIX: &str = "CANVAS";

/// External reasoning oracle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Whether the oracle is consulted at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model name (e.g., "gpt-4.1-mini")
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom OpenAI-compatible endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Upper bound on a single oracle call
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_oracle_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_oracle_timeout_secs() -> u64 {
    60
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            model: default_oracle_model(),
            api_key: None,
            api_base_url: None,
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

impl OracleSettings {
    /// The oracle is usable only when enabled and a key is present.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("hash" for the offline embedder, "openai")
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model name for API providers
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Maximum concurrent embedding requests during reindex
    #[serde(default = "default_embedding_concurrency")]
    pub concurrency: usize,
}

fn default_embedding_provider() -> String {
    "hash".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_embedding_concurrency() -> usize {
    4
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            api_key: None,
            api_base_url: None,
            concurrency: default_embedding_concurrency(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Oracle configuration
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            oracle: OracleSettings::default(),
            embeddings: EmbeddingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/mindcanvas/config.*)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CANVAS_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CanvasError> {
        let config = build_layered(cli_config_path)?;
        config
            .try_deserialize()
            .map_err(|e| CanvasError::Config(e.to_string()))
    }

    /// Load one named section from the same layered sources.
    ///
    /// Used by crates that own their config type (e.g. the `graph` section).
    /// A missing section yields `T::default()`.
    pub fn load_section<T>(cli_config_path: Option<&str>, section: &str) -> Result<T, CanvasError>
    where
        T: DeserializeOwned + Default,
    {
        let config = build_layered(cli_config_path)?;
        match config.get::<T>(section) {
            Ok(value) => Ok(value),
            Err(config::ConfigError::NotFound(_)) => Ok(T::default()),
            Err(e) => Err(CanvasError::Config(e.to_string())),
        }
    }

    /// Expand ~ in db_path to actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

fn build_layered(cli_config_path: Option<&str>) -> Result<Config, CanvasError> {
    let config_dir = ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let default_config_path = config_dir.join("config");

    let mut builder = Config::builder()
        .set_default("db_path", default_db_path())
        .map_err(|e| CanvasError::Config(e.to_string()))?
        .set_default("log_level", default_log_level())
        .map_err(|e| CanvasError::Config(e.to_string()))?
        .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

    if let Some(path) = cli_config_path {
        builder = builder.add_source(File::with_name(path).required(true));
    }

    // Format: CANVAS_DB_PATH, CANVAS_ORACLE__API_KEY, CANVAS_GRAPH__DENSITY__EPSILON
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|e| CanvasError::Config(e.to_string()))
}
