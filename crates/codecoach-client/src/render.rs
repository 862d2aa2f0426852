//! Plain-text presentation of a session snapshot.

use crate::controller::{ConnectionState, SessionView};
use codecoach_types::Speaker;
use std::fmt::Write;

/// Renders `view` as terminal text: a status line, an optional inline error,
/// then one line per transcript entry. Entries still being recognised end in
/// an ellipsis.
pub fn render(view: &SessionView<'_>) -> String {
    let mut out = String::new();

    match view.state {
        ConnectionState::Disconnected => out.push_str("( ) Disconnected"),
        ConnectionState::Connecting => out.push_str("(.) Connecting..."),
        ConnectionState::Connected => {
            let _ = write!(out, "(*) {}", view.display.label);
            if let Some(room) = view.room {
                let _ = write!(out, " in {room}");
            }
        }
    }
    if view.muted {
        out.push_str(" [muted]");
    }
    out.push('\n');

    if let Some(error) = view.error {
        let _ = writeln!(out, "! {error}");
    }

    for message in view.messages {
        let who = match message.sender {
            Speaker::User => "You",
            Speaker::Agent => "Coach",
        };
        let tail = if message.is_final { "" } else { "..." };
        let _ = writeln!(out, "{who}: {}{tail}", message.text);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{project, CONNECTING};
    use chrono::Utc;
    use codecoach_transcript::Message;
    use codecoach_types::AgentPhase;

    fn message(id: &str, sender: Speaker, text: &str, is_final: bool) -> Message {
        Message {
            id: id.to_string(),
            sender,
            text: text.to_string(),
            timestamp: Utc::now(),
            is_final,
        }
    }

    #[test]
    fn disconnected_with_error() {
        let view = SessionView {
            state: ConnectionState::Disconnected,
            muted: false,
            agent_phase: "connecting",
            display: CONNECTING,
            messages: &[],
            error: Some("Could not start a session."),
            room: None,
        };

        assert_eq!(render(&view), "( ) Disconnected\n! Could not start a session.\n");
    }

    #[test]
    fn connected_transcript() {
        let messages = [
            message("user-s1", Speaker::User, "what is a hash table", true),
            message("agent-0", Speaker::Agent, "A hash table maps keys", false),
        ];
        let view = SessionView {
            state: ConnectionState::Connected,
            muted: true,
            agent_phase: "speaking",
            display: project(AgentPhase::Speaking),
            messages: &messages,
            error: None,
            room: Some("codecoach-1"),
        };

        assert_eq!(
            render(&view),
            "(*) Speaking in codecoach-1 [muted]\n\
             You: what is a hash table\n\
             Coach: A hash table maps keys...\n"
        );
    }

    #[test]
    fn render_is_pure() {
        let messages = [message("user-a", Speaker::User, "hi", false)];
        let view = SessionView {
            state: ConnectionState::Connecting,
            muted: false,
            agent_phase: "idle",
            display: project(AgentPhase::parse("idle")),
            messages: &messages,
            error: None,
            room: None,
        };
        assert_eq!(render(&view), render(&view));
        assert!(render(&view).starts_with("(.) Connecting..."));
    }
}
