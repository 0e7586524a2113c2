//! Configuration loading and API key resolution
//!
//! Configuration comes from an optional TOML file. Every section has compiled
//! defaults, so a missing file is not fatal. The gateway API key is the one
//! required value and resolves from the environment first, then the TOML file.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the gateway credential
pub const API_KEY_ENV_VAR: &str = "NVIDIA_API_KEY";

/// Default hosted inference endpoint (OpenAI-compatible)
pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "nvidia/llama-3.3-nemotron-super-49b-v1.5";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub sessions: SessionConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Model gateway client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Per-call timeout; an expired call is treated as a gateway failure
    pub timeout_secs: u64,
    /// Credential fallback when the environment variable is unset
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 4096,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Conversation store bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Least-recently-used sessions are evicted beyond this count
    pub max_sessions: usize,
    /// Sessions idle longer than this are dropped
    pub idle_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            idle_ttl_secs: 3600,
        }
    }
}

/// Logging settings (RUST_LOG takes precedence)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file found at this path; compiled defaults in use
    Defaults(PathBuf),
    /// No config directory could be determined; compiled defaults in use
    BuiltIn,
}

/// Default config file location: `<config_dir>/termscope/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("termscope").join("config.toml"))
}

/// Load configuration from an explicit path or the platform default.
///
/// A missing file yields defaults. A file that exists but cannot be read or
/// parsed is an error; silently ignoring a broken config would hide typos.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok((TomlConfig::default(), ConfigSource::BuiltIn)),
        },
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok((TomlConfig::default(), ConfigSource::Defaults(path)));
    }

    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    Ok((config, ConfigSource::File(path)))
}

/// Parse TOML text into a configuration
pub fn parse_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl TomlConfig {
    /// Reject values the services cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sessions.max_sessions == 0 {
            return Err(Error::Config(
                "sessions.max_sessions must be at least 1".to_string(),
            ));
        }
        if self.sessions.idle_ttl_secs == 0 {
            return Err(Error::Config(
                "sessions.idle_ttl_secs must be at least 1".to_string(),
            ));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(Error::Config(
                "gateway.timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.gateway.temperature) {
            return Err(Error::Config(format!(
                "gateway.temperature out of range: {}",
                self.gateway.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.gateway.top_p) {
            return Err(Error::Config(format!(
                "gateway.top_p out of range: {}",
                self.gateway.top_p
            )));
        }
        Ok(())
    }
}

/// Resolve the gateway API key
///
/// **Priority:** ENV (`NVIDIA_API_KEY`) → TOML `gateway.api_key`
pub fn resolve_api_key(gateway: &GatewayConfig) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok();
    let toml_key = gateway.api_key.as_deref();

    if let (Some(env), Some(file)) = (&env_key, toml_key) {
        if is_valid_key(env) && is_valid_key(file) {
            tracing::warn!(
                "API key found in both {} and TOML config. Using environment (highest priority).",
                API_KEY_ENV_VAR
            );
        }
    }

    if let Some(key) = env_key {
        if is_valid_key(&key) {
            tracing::info!("API key loaded from environment variable");
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = toml_key {
        if is_valid_key(key) {
            tracing::info!("API key loaded from TOML config");
            return Ok(key.trim().to_string());
        }
    }

    Err(Error::Config(format!(
        "Gateway API key not configured. Set one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: [gateway] api_key = \"your-key\"",
        API_KEY_ENV_VAR
    )))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
