use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;

/// Signs LiveKit join tokens for the credential endpoint.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: LiveKitConfig,
}

impl TokenIssuer {
    pub fn new(config: LiveKitConfig) -> Self {
        Self { config }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.config.token_ttl_seconds)
    }

    /// Issues a token that lets `identity` join `room` and publish audio.
    ///
    /// The identity doubles as the display name.
    pub fn issue(&self, room: &str, identity: &str) -> Result<String, VoiceError> {
        if self.config.api_key.is_empty() || self.config.api_secret.is_empty() {
            return Err(VoiceError::Config(
                "LiveKit API key and secret must be set".to_string(),
            ));
        }
        if room.is_empty() || identity.is_empty() {
            return Err(VoiceError::Config(
                "room and identity must not be empty".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(identity)
            .with_name(identity)
            .with_grants(VideoGrants {
                room_join: true,
                room: room.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(self.token_ttl());

        let jwt = token.to_jwt()?;
        tracing::debug!(room, identity, "issued LiveKit join token");
        Ok(jwt)
    }
}
