//! Client configuration loading from file and environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything the client needs to reach the credential endpoint and the
/// realtime server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the token server (`POST {token_url}/token`).
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Realtime server URL handed to the session on connect.
    #[serde(default = "default_livekit_url")]
    pub livekit_url: String,

    /// Prefix of generated room names.
    #[serde(default = "default_room_prefix")]
    pub room_prefix: String,

    /// Prefix of generated participant identities.
    #[serde(default = "default_identity_prefix")]
    pub identity_prefix: String,

    /// Identity substring that marks the agent participant.
    #[serde(default = "default_agent_marker")]
    pub agent_marker: String,
}

fn default_token_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_livekit_url() -> String {
    codecoach_voice::DEV_LIVEKIT_URL.to_string()
}

fn default_room_prefix() -> String {
    "codecoach".to_string()
}

fn default_identity_prefix() -> String {
    "user".to_string()
}

fn default_agent_marker() -> String {
    codecoach_transcript::DEFAULT_AGENT_MARKER.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            livekit_url: default_livekit_url(),
            room_prefix: default_room_prefix(),
            identity_prefix: default_identity_prefix(),
            agent_marker: default_agent_marker(),
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
/// - `CODECOACH_TOKEN_URL` overrides `token_url`
/// - `CODECOACH_LIVEKIT_URL` overrides `livekit_url`
/// - `CODECOACH_AGENT_MARKER` overrides `agent_marker`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                ClientConfig::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => ClientConfig::default(),
    };

    Ok(apply_overrides(config, |key| std::env::var(key).ok()))
}

/// Applies overrides looked up by environment variable name. Blank values
/// are ignored.
pub fn apply_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("CODECOACH_TOKEN_URL") {
        config.token_url = url;
    }
    if let Some(url) = get("CODECOACH_LIVEKIT_URL") {
        config.livekit_url = url;
    }
    if let Some(marker) = get("CODECOACH_AGENT_MARKER") {
        config.agent_marker = marker;
    }
    config
}
