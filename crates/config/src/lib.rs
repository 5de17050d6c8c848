//! Configuration loading, validation, and management for Medgate.
//!
//! Loads configuration from `~/.medgate/config.toml` with environment
//! variable overrides. Validates all settings at startup. The shared
//! secret and provider API key are never printed: `Debug` redacts them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The root configuration structure.
///
/// Maps directly to `~/.medgate/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The process-wide shared secret callers must present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Assistant provider configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. `":memory:"` for an ephemeral store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "ehr.db".into()
}

/// Assistant provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// API key for the remote provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-attempt timeout for the remote call, in seconds. Valid 10–30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum completion attempts before surfacing failure. Valid 1–2.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_max_attempts() -> u32 {
    2
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shared_secret", &redact(&self.shared_secret))
            .field("store", &self.store)
            .field("assistant", &self.assistant)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            store: StoreConfig::default(),
            assistant: AssistantConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl AppConfig {
    /// Load configuration from the default path (~/.medgate/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `MEDGATE_SHARED_SECRET` — the caller credential
    /// - `MEDGATE_API_KEY` / `OPENAI_API_KEY` — provider API key
    /// - `MEDGATE_MODEL` — model name
    /// - `MEDGATE_PORT` — gateway port
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(secret) = std::env::var("MEDGATE_SHARED_SECRET") {
            config.shared_secret = Some(secret);
        }

        if config.assistant.api_key.is_none() {
            config.assistant.api_key = std::env::var("MEDGATE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("MEDGATE_MODEL") {
            config.assistant.model = model;
        }

        if let Ok(port) = std::env::var("MEDGATE_PORT") {
            config.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("MEDGATE_PORT is not a port number: {port}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".medgate")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.shared_secret {
            if secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "shared_secret must not be empty".into(),
                ));
            }
        }

        if !(10..=30).contains(&self.assistant.timeout_secs) {
            return Err(ConfigError::ValidationError(
                "assistant.timeout_secs must be between 10 and 30".into(),
            ));
        }

        if !(1..=2).contains(&self.assistant.max_attempts) {
            return Err(ConfigError::ValidationError(
                "assistant.max_attempts must be 1 or 2".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }
}
