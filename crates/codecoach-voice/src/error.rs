use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("LiveKit token error: {0}")]
    Token(#[from] livekit_api::access_token::AccessTokenError),

    #[error("credential request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credential endpoint returned HTTP {0}")]
    TokenStatus(u16),

    #[error("malformed credential response: {0}")]
    MalformedCredential(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("realtime session error: {0}")]
    Session(String),

    #[error("microphone toggle failed: {0}")]
    Microphone(String),

    #[error("a session is already connecting or connected")]
    Busy,
}

impl VoiceError {
    /// The single inline message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Token(_)
            | Self::Http(_)
            | Self::TokenStatus(_)
            | Self::MalformedCredential(_)
            | Self::Config(_) => {
                "Could not start a session. Check that the token server is running and try again."
                    .to_string()
            }
            Self::Session(detail) => format!("Voice session ended unexpectedly: {detail}"),
            Self::Microphone(_) => "The microphone did not respond. Try again.".to_string(),
            Self::Busy => "A session is already starting.".to_string(),
        }
    }
}
