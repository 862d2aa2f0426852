//! Maps the agent's turn-taking phase to a status display record.

use codecoach_types::AgentPhase;
use serde::Serialize;

/// Style tokens and label for the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub background_style: &'static str,
    pub text_style: &'static str,
    pub indicator_style: &'static str,
    pub label: &'static str,
}

pub const LISTENING: DisplayState = DisplayState {
    background_style: "bg-emerald-500/10",
    text_style: "text-emerald-400",
    indicator_style: "bg-emerald-400 animate-pulse",
    label: "Listening",
};

pub const THINKING: DisplayState = DisplayState {
    background_style: "bg-amber-500/10",
    text_style: "text-amber-400",
    indicator_style: "bg-amber-400 animate-bounce",
    label: "Thinking",
};

pub const SPEAKING: DisplayState = DisplayState {
    background_style: "bg-sky-500/10",
    text_style: "text-sky-400",
    indicator_style: "bg-sky-400 animate-ping",
    label: "Speaking",
};

pub const CONNECTING: DisplayState = DisplayState {
    background_style: "bg-zinc-500/10",
    text_style: "text-zinc-400",
    indicator_style: "bg-zinc-400",
    label: "Connecting",
};

/// Looks up the display record for an agent phase. `Unrecognized` phases,
/// including `"idle"`, show as connecting.
pub fn project(phase: AgentPhase) -> DisplayState {
    match phase {
        AgentPhase::Listening => LISTENING,
        AgentPhase::Thinking => THINKING,
        AgentPhase::Speaking => SPEAKING,
        AgentPhase::Connecting | AgentPhase::Unrecognized => CONNECTING,
    }
}
