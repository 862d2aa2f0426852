//! Shared types for the CodeCoach voice client.
//!
//! This crate holds the data model that crosses crate boundaries: the
//! transcription segments delivered by the realtime session, the participant
//! references attached to them, the agent's turn-taking phase, and the wire
//! format of the credential exchange.
//!
//! It has no I/O and no async code, so every other crate in the workspace can
//! depend on it without pulling in a runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
///
/// The classification is closed: anything that is not recognised as the agent
/// is the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person talking into the local microphone.
    User,
    /// The remote voice agent.
    Agent,
}

impl Speaker {
    /// Returns the lowercase label used as the composite id prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit role of a room participant, when the transport reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    /// A human participant.
    Standard,
    /// An agent worker joined to the room.
    Agent,
}

/// The participant a transcription batch originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    /// Room-unique participant identity.
    pub identity: String,
    /// Role reported by the transport. `None` means the transport did not
    /// say, and callers fall back to inspecting `identity`.
    #[serde(default)]
    pub kind: Option<ParticipantKind>,
}

impl ParticipantRef {
    /// A participant known only by identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            kind: None,
        }
    }

    /// A participant with an explicit role.
    pub fn with_kind(identity: impl Into<String>, kind: ParticipantKind) -> Self {
        Self {
            identity: identity.into(),
            kind: Some(kind),
        }
    }

    /// Returns true when this participant is the agent.
    ///
    /// An explicit `kind` always wins. Without one, the identity is checked for
    /// `agent_marker` as a substring.
    pub fn is_agent(&self, agent_marker: &str) -> bool {
        match self.kind {
            Some(kind) => kind == ParticipantKind::Agent,
            None => !agent_marker.is_empty() && self.identity.contains(agent_marker),
        }
    }
}

/// Which of the two transcription feeds a batch arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptChannel {
    /// Room-wide transcription events, attributed to a participant.
    Primary,
    /// The per-agent transcription feed. Always spoken by the agent.
    Secondary,
}

/// A unit of streamed transcription text.
///
/// Segments are re-sent as recognition progresses: the same `id` arrives many
/// times with growing `text`, and eventually with `final` set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Segment id assigned by the transcriber. The agent feed may omit it.
    #[serde(default)]
    pub id: Option<String>,
    /// Latest recognised text for this segment.
    #[serde(default)]
    pub text: String,
    /// Whether the transcriber considers this text settled. `None` when the
    /// source did not report finality.
    #[serde(default, rename = "final")]
    pub is_final: Option<bool>,
    /// When the transcriber first saw this segment, if it says.
    #[serde(default)]
    pub first_received_time: Option<DateTime<Utc>>,
}

impl Segment {
    /// Builds a segment with an id and explicit finality.
    pub fn new(id: impl Into<String>, text: impl Into<String>, is_final: bool) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            is_final: Some(is_final),
            first_received_time: None,
        }
    }

    /// Builds a segment with no id and no reported finality, as the agent feed
    /// sometimes delivers them.
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// The agent's conversational turn-taking phase.
///
/// Phases arrive from the transport as strings. Anything outside the four named
/// phases is `Unrecognized`, which is displayed like `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Listening,
    Thinking,
    Speaking,
    Connecting,
    Unrecognized,
}

impl AgentPhase {
    /// Exact-match parse. Never fails.
    pub fn parse(value: &str) -> Self {
        match value {
            "listening" => Self::Listening,
            "thinking" => Self::Thinking,
            "speaking" => Self::Speaking,
            "connecting" => Self::Connecting,
            _ => Self::Unrecognized,
        }
    }

    /// Returns the canonical string for this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listening => "listening",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
            Self::Connecting => "connecting",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

mod wire;
pub use wire::{TokenRequest, TokenResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_kind_overrides_identity() {
        let p = ParticipantRef::with_kind("agent-lookalike", ParticipantKind::Standard);
        assert!(!p.is_agent("agent"));

        let p = ParticipantRef::with_kind("worker-7", ParticipantKind::Agent);
        assert!(p.is_agent("agent"));
    }

    #[test]
    fn identity_substring_heuristic() {
        assert!(ParticipantRef::new("agent-AJ_x83").is_agent("agent"));
        assert!(ParticipantRef::new("codecoach-agent").is_agent("agent"));
        assert!(!ParticipantRef::new("user-1712").is_agent("agent"));
        assert!(!ParticipantRef::new("user-1712").is_agent(""));
    }

    #[test]
    fn agent_phase_parse() {
        assert_eq!(AgentPhase::parse("listening"), AgentPhase::Listening);
        assert_eq!(AgentPhase::parse("thinking"), AgentPhase::Thinking);
        assert_eq!(AgentPhase::parse("speaking"), AgentPhase::Speaking);
        assert_eq!(AgentPhase::parse("connecting"), AgentPhase::Connecting);
        assert_eq!(AgentPhase::parse("idle"), AgentPhase::Unrecognized);
        assert_eq!(AgentPhase::parse("Listening"), AgentPhase::Unrecognized);
        assert_eq!(AgentPhase::parse(""), AgentPhase::Unrecognized);
    }

    #[test]
    fn segment_deserializes_transport_shape() {
        let json = r#"{"id":"s1","text":"what is","final":false,"firstReceivedTime":"2026-01-02T03:04:05Z"}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.id.as_deref(), Some("s1"));
        assert_eq!(seg.is_final, Some(false));
        assert!(seg.first_received_time.is_some());

        let bare: Segment = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(bare, Segment::anonymous("hello"));
    }
}
