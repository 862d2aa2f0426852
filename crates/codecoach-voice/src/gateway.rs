use crate::error::VoiceError;
use codecoach_types::{TokenRequest, TokenResponse};
use std::time::Duration;

/// Upper bound on one credential round-trip.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A credential returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub token: String,
    pub room: String,
    pub identity: String,
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("token", &"[REDACTED]")
            .field("room", &self.room)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Client for the credential endpoint.
///
/// One request per call. Failures are returned as-is; there is no retry.
#[derive(Debug, Clone)]
pub struct TokenGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl TokenGateway {
    /// Builds a gateway for the token server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/token", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL of the `/token` endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests a credential for `identity` in `room`.
    ///
    /// # Errors
    ///
    /// - [`VoiceError::Http`] when the request cannot be sent or times out.
    /// - [`VoiceError::TokenStatus`] for any non-2xx response.
    /// - [`VoiceError::MalformedCredential`] when the body is not a token
    ///   response or the token is empty.
    pub async fn fetch_token(
        &self,
        room: &str,
        identity: &str,
    ) -> Result<SessionCredential, VoiceError> {
        tracing::debug!(endpoint = %self.endpoint, room, identity, "requesting session token");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TokenRequest::new(room, identity))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), room, "token endpoint rejected request");
            return Err(VoiceError::TokenStatus(status.as_u16()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::MalformedCredential(e.to_string()))?;

        if body.token.trim().is_empty() {
            return Err(VoiceError::MalformedCredential("empty token".to_string()));
        }

        Ok(SessionCredential {
            token: body.token,
            room: body.room.unwrap_or_else(|| room.to_string()),
            identity: body.identity.unwrap_or_else(|| identity.to_string()),
        })
    }
}
