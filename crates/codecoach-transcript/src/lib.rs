//! Transcript synchronization for the CodeCoach voice client.
//!
//! Two feeds deliver transcription text while a session is live: room-wide
//! transcription events attributed to a participant, and the agent's own
//! transcription feed. Both re-send the same segment many times as recognition
//! progresses, in no particular order relative to each other.
//!
//! [`Transcript`] folds both feeds into one ordered timeline. Every segment is
//! an upsert keyed by a composite id (`<speaker>-<segment id>`), so arrival
//! order between the feeds does not matter:
//!
//! - a new, non-empty segment appends a [`Message`];
//! - a known segment replaces the message text and ORs in finality;
//! - an empty, unknown segment is dropped.
//!
//! Entries are never removed or reordered until [`Transcript::reset`].

use chrono::{DateTime, Utc};
use codecoach_types::{ParticipantRef, Segment, Speaker, TranscriptChannel};
use serde::Serialize;
use std::collections::HashMap;

/// Identity substring that marks a participant as the agent when the
/// transport does not report an explicit role.
pub const DEFAULT_AGENT_MARKER: &str = "agent";

/// One entry of the rendered transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Composite id, `<speaker>-<segment id>`.
    pub id: String,
    pub sender: Speaker,
    /// Latest known text. Replaced wholesale on update.
    pub text: String,
    /// When this id was first observed. Never changes after creation.
    pub timestamp: DateTime<Utc>,
    /// Sticky: once true, stays true.
    pub is_final: bool,
}

/// What a single [`Transcript::ingest`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub updated: usize,
    pub dropped: usize,
}

impl IngestSummary {
    /// True when the timeline was touched.
    pub fn changed(&self) -> bool {
        self.inserted > 0 || self.updated > 0
    }
}

/// The ordered, deduplicated transcript timeline.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    index: HashMap<String, usize>,
    agent_marker: String,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_MARKER)
    }
}

impl Transcript {
    /// Creates an empty timeline that treats identities containing
    /// `agent_marker` as the agent.
    pub fn new(agent_marker: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            index: HashMap::new(),
            agent_marker: agent_marker.into(),
        }
    }

    /// Messages in order of first observation.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by composite id.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.index.get(id).map(|&i| &self.messages[i])
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discards the whole timeline.
    pub fn reset(&mut self) {
        tracing::debug!(discarded = self.messages.len(), "transcript reset");
        self.messages.clear();
        self.index.clear();
    }

    /// Folds a batch of segments into the timeline, stamping new primary
    /// entries with the current time.
    pub fn ingest(
        &mut self,
        segments: &[Segment],
        channel: TranscriptChannel,
        participant: Option<&ParticipantRef>,
    ) -> IngestSummary {
        self.ingest_at(segments, channel, participant, Utc::now())
    }

    /// Like [`Transcript::ingest`], with an explicit ingestion time.
    pub fn ingest_at(
        &mut self,
        segments: &[Segment],
        channel: TranscriptChannel,
        participant: Option<&ParticipantRef>,
        now: DateTime<Utc>,
    ) -> IngestSummary {
        let speaker = self.classify(channel, participant);
        let mut summary = IngestSummary::default();

        for (position, segment) in segments.iter().enumerate() {
            let id = composite_id(speaker, segment, position);
            let reported_final = segment
                .is_final
                .unwrap_or(channel == TranscriptChannel::Secondary);

            if let Some(&i) = self.index.get(&id) {
                let existing = &mut self.messages[i];
                // Empty text may settle finality but never blanks an entry.
                if !segment.text.trim().is_empty() {
                    existing.text.clone_from(&segment.text);
                }
                existing.is_final = existing.is_final || reported_final;
                summary.updated += 1;
                continue;
            }

            if segment.text.trim().is_empty() {
                summary.dropped += 1;
                continue;
            }

            let timestamp = match channel {
                TranscriptChannel::Primary => now,
                TranscriptChannel::Secondary => segment.first_received_time.unwrap_or(now),
            };
            self.index.insert(id.clone(), self.messages.len());
            self.messages.push(Message {
                id,
                sender: speaker,
                text: segment.text.clone(),
                timestamp,
                is_final: reported_final,
            });
            summary.inserted += 1;
        }

        tracing::debug!(
            ?channel,
            speaker = %speaker,
            inserted = summary.inserted,
            updated = summary.updated,
            dropped = summary.dropped,
            total = self.messages.len(),
            "ingested transcript batch"
        );
        summary
    }

    fn classify(
        &self,
        channel: TranscriptChannel,
        participant: Option<&ParticipantRef>,
    ) -> Speaker {
        match channel {
            TranscriptChannel::Secondary => Speaker::Agent,
            TranscriptChannel::Primary => match participant {
                Some(p) if p.is_agent(&self.agent_marker) => Speaker::Agent,
                _ => Speaker::User,
            },
        }
    }
}

/// Builds the reconciliation key for a segment.
///
/// A segment without an id falls back to its position in the batch. Those
/// keys are only stable while the sender keeps batches the same shape.
fn composite_id(speaker: Speaker, segment: &Segment, position: usize) -> String {
    match segment.id.as_deref() {
        Some(id) => format!("{speaker}-{id}"),
        None => format!("{speaker}-{position}"),
    }
}

#[cfg(test)]
mod tests;
