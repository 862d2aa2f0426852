//! Token server configuration loading from file and environment variables.

use codecoach_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LiveKit credentials used to sign join tokens.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "codecoach_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `CODECOACH_HOST` overrides `server.host`
/// - `TOKEN_SERVER_PORT` overrides `server.port`
/// - `LIVEKIT_URL` overrides `livekit.url`
/// - `LIVEKIT_API_KEY` overrides `livekit.api_key`
/// - `LIVEKIT_API_SECRET` overrides `livekit.api_secret`
/// - `CODECOACH_LOG_LEVEL` overrides `logging.level`
/// - `CODECOACH_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    Ok(apply_overrides(config, |key| std::env::var(key).ok()))
}

/// Applies overrides looked up by environment variable name.
pub fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(host) = lookup("CODECOACH_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("TOKEN_SERVER_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(url) = lookup("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = lookup("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = lookup("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
    if let Some(level) = lookup("CODECOACH_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("CODECOACH_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    config
}
