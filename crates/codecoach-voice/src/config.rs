use serde::{Deserialize, Serialize};
use std::fmt;

/// LiveKit server used by `livekit-server --dev`.
pub const DEV_LIVEKIT_URL: &str = "ws://localhost:7880";
/// API key accepted by a dev-mode LiveKit server.
pub const DEV_LIVEKIT_API_KEY: &str = "devkey";
/// API secret accepted by a dev-mode LiveKit server.
pub const DEV_LIVEKIT_API_SECRET: &str = "secret";

fn default_url() -> String {
    DEV_LIVEKIT_URL.to_string()
}

fn default_api_key() -> String {
    DEV_LIVEKIT_API_KEY.to_string()
}

fn default_api_secret() -> String {
    DEV_LIVEKIT_API_SECRET.to_string()
}

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(skip_serializing, default = "default_api_secret")]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            api_key: default_api_key(),
            api_secret: default_api_secret(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}
