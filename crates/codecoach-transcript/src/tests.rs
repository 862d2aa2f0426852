use super::*;
use chrono::{Duration, TimeZone};
use codecoach_types::ParticipantKind;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn user() -> ParticipantRef {
    ParticipantRef::new("user-1709294400")
}

fn agent() -> ParticipantRef {
    ParticipantRef::new("agent-AJ_7xQ2")
}

#[test]
fn partial_then_final_updates_in_place() {
    let mut transcript = Transcript::default();

    transcript.ingest_at(
        &[Segment::new("s1", "what is", false)],
        TranscriptChannel::Primary,
        Some(&user()),
        t0(),
    );
    assert_eq!(transcript.len(), 1);
    let first = &transcript.messages()[0];
    assert_eq!(first.id, "user-s1");
    assert_eq!(first.sender, Speaker::User);
    assert_eq!(first.text, "what is");
    assert!(!first.is_final);

    transcript.ingest_at(
        &[Segment::new("s1", "what is a hash table", true)],
        TranscriptChannel::Primary,
        Some(&user()),
        t0() + Duration::seconds(2),
    );
    assert_eq!(transcript.len(), 1);
    let updated = &transcript.messages()[0];
    assert_eq!(updated.text, "what is a hash table");
    assert!(updated.is_final);
    assert_eq!(updated.timestamp, t0());
}

#[test]
fn finality_is_sticky() {
    let mut transcript = Transcript::default();
    let p = user();

    transcript.ingest_at(
        &[Segment::new("s1", "done", true)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("s1", "done, late partial", false)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );

    let msg = transcript.get("user-s1").unwrap();
    assert!(msg.is_final);
    assert_eq!(msg.text, "done, late partial");
}

#[test]
fn repeated_final_segment_is_idempotent() {
    let mut transcript = Transcript::default();
    let batch = [Segment::new("s9", "binary search", true)];

    transcript.ingest_at(&batch, TranscriptChannel::Primary, Some(&user()), t0());
    let before = transcript.messages().to_vec();
    let summary = transcript.ingest_at(
        &batch,
        TranscriptChannel::Primary,
        Some(&user()),
        t0() + Duration::seconds(30),
    );

    assert_eq!(summary.updated, 1);
    assert_eq!(transcript.messages(), before.as_slice());
}

#[test]
fn empty_unknown_segment_is_dropped() {
    let mut transcript = Transcript::default();

    let summary = transcript.ingest_at(
        &[Segment::new("s1", "   ", false), Segment::new("s2", "", true)],
        TranscriptChannel::Primary,
        Some(&user()),
        t0(),
    );

    assert!(transcript.is_empty());
    assert_eq!(summary.dropped, 2);
    assert!(!summary.changed());
}

#[test]
fn empty_update_keeps_text_but_settles_finality() {
    let mut transcript = Transcript::default();
    let p = user();

    transcript.ingest_at(
        &[Segment::new("s1", "linked list", false)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("s1", " ", true)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );

    let msg = transcript.get("user-s1").unwrap();
    assert_eq!(msg.text, "linked list");
    assert!(msg.is_final);
}

#[test]
fn primary_agent_participant_is_classified_by_identity() {
    let mut transcript = Transcript::default();

    transcript.ingest_at(
        &[Segment::new("s1", "Hi, I'm your coach.", true)],
        TranscriptChannel::Primary,
        Some(&agent()),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("s1", "Hi!", true)],
        TranscriptChannel::Primary,
        Some(&user()),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("s2", "no participant", true)],
        TranscriptChannel::Primary,
        None,
        t0(),
    );

    let ids: Vec<_> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["agent-s1", "user-s1", "user-s2"]);
    assert_eq!(transcript.messages()[0].sender, Speaker::Agent);
    assert_eq!(transcript.messages()[2].sender, Speaker::User);
}

#[test]
fn explicit_participant_kind_wins_over_identity() {
    let mut transcript = Transcript::default();
    let worker = ParticipantRef::with_kind("worker-42", ParticipantKind::Agent);

    transcript.ingest_at(
        &[Segment::new("s1", "Let's begin.", true)],
        TranscriptChannel::Primary,
        Some(&worker),
        t0(),
    );

    assert_eq!(transcript.messages()[0].sender, Speaker::Agent);
}

#[test]
fn custom_agent_marker() {
    let mut transcript = Transcript::new("coach");

    transcript.ingest_at(
        &[Segment::new("a", "hello", true)],
        TranscriptChannel::Primary,
        Some(&ParticipantRef::new("coach-1")),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("b", "hey", true)],
        TranscriptChannel::Primary,
        Some(&agent()),
        t0(),
    );

    assert_eq!(transcript.messages()[0].sender, Speaker::Agent);
    assert_eq!(transcript.messages()[1].sender, Speaker::User);
}

#[test]
fn secondary_feed_uses_positional_ids() {
    let mut transcript = Transcript::default();

    transcript.ingest_at(
        &[Segment::anonymous("First,"), Segment::anonymous("think about hashing.")],
        TranscriptChannel::Secondary,
        None,
        t0(),
    );

    let ids: Vec<_> = transcript.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["agent-0", "agent-1"]);
    assert!(transcript.messages().iter().all(|m| m.sender == Speaker::Agent));
    // Finality defaults to true when the agent feed omits it.
    assert!(transcript.messages().iter().all(|m| m.is_final));
}

#[test]
fn secondary_feed_ignores_participant() {
    let mut transcript = Transcript::default();

    transcript.ingest_at(
        &[Segment::new("x", "text", false)],
        TranscriptChannel::Secondary,
        Some(&user()),
        t0(),
    );

    assert_eq!(transcript.messages()[0].id, "agent-x");
    assert!(!transcript.messages()[0].is_final);
}

#[test]
fn secondary_timestamp_prefers_segment_time() {
    let mut transcript = Transcript::default();
    let reported = t0() - Duration::seconds(5);
    let mut seg = Segment::new("r1", "Consider the edge cases.", false);
    seg.first_received_time = Some(reported);

    transcript.ingest_at(
        &[seg, Segment::new("r2", "Also nulls.", false)],
        TranscriptChannel::Secondary,
        None,
        t0(),
    );

    assert_eq!(transcript.get("agent-r1").unwrap().timestamp, reported);
    assert_eq!(transcript.get("agent-r2").unwrap().timestamp, t0());
}

#[test]
fn primary_timestamp_is_ingestion_time() {
    let mut transcript = Transcript::default();
    let mut seg = Segment::new("s1", "hello", false);
    seg.first_received_time = Some(t0() - Duration::hours(1));

    transcript.ingest_at(&[seg], TranscriptChannel::Primary, Some(&user()), t0());

    assert_eq!(transcript.messages()[0].timestamp, t0());
}

#[test]
fn both_feeds_for_agent_share_identity() {
    let mut transcript = Transcript::default();

    transcript.ingest_at(
        &[Segment::new("seg_1", "Sure,", false)],
        TranscriptChannel::Secondary,
        None,
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("seg_1", "Sure, let's go.", true)],
        TranscriptChannel::Primary,
        Some(&agent()),
        t0() + Duration::seconds(1),
    );

    assert_eq!(transcript.len(), 1);
    let msg = transcript.get("agent-seg_1").unwrap();
    assert_eq!(msg.text, "Sure, let's go.");
    assert!(msg.is_final);
    assert_eq!(msg.timestamp, t0());
}

#[test]
fn updates_never_reorder() {
    let mut transcript = Transcript::default();
    let p = user();

    transcript.ingest_at(
        &[Segment::new("a", "one", false)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("b", "two", false)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("c", "three", false)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.ingest_at(
        &[Segment::new("a", "one!", true)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );

    let texts: Vec<_> = transcript.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["one!", "two", "three"]);
}

#[test]
fn length_never_decreases() {
    let mut transcript = Transcript::default();
    let batches = vec![
        (vec![Segment::new("1", "a", false)], TranscriptChannel::Primary),
        (vec![], TranscriptChannel::Primary),
        (vec![Segment::anonymous(""), Segment::anonymous("b")], TranscriptChannel::Secondary),
        (vec![Segment::new("1", "", true)], TranscriptChannel::Primary),
        (vec![Segment::anonymous("c")], TranscriptChannel::Secondary),
    ];

    let mut last = 0;
    for (batch, channel) in batches {
        transcript.ingest_at(&batch, channel, Some(&user()), t0());
        assert!(transcript.len() >= last);
        last = transcript.len();
    }
    assert_eq!(last, 3);
}

#[test]
fn reset_starts_a_fresh_session() {
    let mut transcript = Transcript::default();
    let p = user();

    transcript.ingest_at(
        &[Segment::new("s1", "old session", true)],
        TranscriptChannel::Primary,
        Some(&p),
        t0(),
    );
    transcript.reset();
    assert!(transcript.is_empty());
    assert!(transcript.get("user-s1").is_none());

    let later = t0() + Duration::minutes(10);
    transcript.ingest_at(
        &[Segment::new("s1", "new session", false)],
        TranscriptChannel::Primary,
        Some(&p),
        later,
    );

    assert_eq!(transcript.len(), 1);
    let msg = transcript.get("user-s1").unwrap();
    assert_eq!(msg.text, "new session");
    assert_eq!(msg.timestamp, later);
    assert!(!msg.is_final);
}

#[test]
fn message_serializes_for_rendering() {
    let mut transcript = Transcript::default();
    transcript.ingest_at(
        &[Segment::new("s1", "hi", true)],
        TranscriptChannel::Primary,
        Some(&user()),
        t0(),
    );

    let json = serde_json::to_value(&transcript.messages()[0]).unwrap();
    assert_eq!(json["id"], "user-s1");
    assert_eq!(json["sender"], "user");
    assert_eq!(json["isFinal"], true);
}
