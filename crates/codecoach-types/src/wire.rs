//! Request and response bodies of the credential exchange.

use serde::{Deserialize, Serialize};

/// Body of `POST /token`.
///
/// Both fields are optional on the wire; the endpoint generates a room or
/// identity when one is missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl TokenRequest {
    pub fn new(room: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            room: Some(room.into()),
            identity: Some(identity.into()),
        }
    }
}

/// Successful response of `POST /token`.
///
/// Only `token` is required; `room` and `identity` echo what the endpoint
/// actually granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}
