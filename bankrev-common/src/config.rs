//! Configuration loading
//!
//! Bootstrap settings come from a TOML file; individual values can be
//! overridden from the environment and the command line. Priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: the services start with defaults.
//! A config file that exists but does not parse is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "BANKREV_CONFIG";
/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "BANKREV_DATABASE";
/// Environment variable overriding the inference endpoint URL
pub const INFERENCE_URL_ENV_VAR: &str = "VLLM_URL";
/// Environment variable overriding the inference model name
pub const INFERENCE_MODEL_ENV_VAR: &str = "BANKREV_MODEL";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Taxonomy file; built-in taxonomy when absent
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error);
    /// RUST_LOG takes precedence when set
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

/// Inference endpoint and classification retry settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InferenceConfig {
    /// OpenAI-compatible chat completions URL
    #[serde(default = "default_inference_url")]
    pub url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-attempt request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum in-flight requests across a batch
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Total attempts per review (not additional retries)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed wait between attempts
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: default_inference_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_connections: default_max_connections(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Apply VLLM_URL / BANKREV_MODEL overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(INFERENCE_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                info!("Inference URL overridden by {}", INFERENCE_URL_ENV_VAR);
                self.url = url;
            }
        }
        if let Ok(model) = std::env::var(INFERENCE_MODEL_ENV_VAR) {
            if !model.trim().is_empty() {
                info!("Inference model overridden by {}", INFERENCE_MODEL_ENV_VAR);
                self.model = model;
            }
        }
    }

    /// Reject values the classifier cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("inference.url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("inference.model must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::Config(
                "inference.max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(Error::Config(
                "inference.max_retries must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "inference.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_inference_url() -> String {
    "http://localhost:8100/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "JosephThePatrician/qwen3_0.6b-reviews-fine-tune-v3".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    250
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_max_connections() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

/// Locate the config file: CLI argument, then BANKREV_CONFIG, then the
/// per-user config directory (only if the file exists there)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("bankrev").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load the TOML config, falling back to defaults when the file is missing
///
/// Runs before the tracing subscriber exists (the log level lives in this
/// file), so it does not log; callers report the outcome afterwards.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(TomlConfig::default());
    };

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolve the database file following the priority order above
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bankrev"))
        .unwrap_or_else(|| PathBuf::from("./bankrev_data"))
        .join("bankrev.db")
}
