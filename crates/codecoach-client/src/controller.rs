//! Session lifecycle: connect, disconnect, mute, and event routing.
//!
//! The controller owns the transcript and the realtime session. All mutation
//! happens through `&mut self`, so connect/disconnect/mute and event handling
//! are serialized by construction and the transcript needs no lock.

use crate::config::ClientConfig;
use crate::projector::{project, DisplayState};
use chrono::Utc;
use codecoach_transcript::{Message, Transcript};
use codecoach_types::{AgentPhase, TranscriptChannel};
use codecoach_voice::{RealtimeSession, RoomEvent, SessionCredential, TokenGateway, VoiceError};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// A read-only snapshot for one render pass.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<'a> {
    pub state: ConnectionState,
    pub muted: bool,
    pub agent_phase: &'a str,
    pub display: DisplayState,
    pub messages: &'a [Message],
    pub error: Option<&'a str>,
    pub room: Option<&'a str>,
}

/// Generates a room name for one connect attempt.
///
/// The millisecond timestamp orders rooms; the random tail keeps two attempts
/// in the same millisecond apart.
pub fn generate_room_name(prefix: &str) -> String {
    let tail = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}-{}", Utc::now().timestamp_millis(), &tail[..6])
}

/// Generates a participant identity.
pub fn generate_identity(prefix: &str) -> String {
    let tail = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &tail[..8])
}

pub struct SessionController<R> {
    config: ClientConfig,
    gateway: TokenGateway,
    room: R,
    transcript: Transcript,
    state: ConnectionState,
    credential: Option<SessionCredential>,
    events: Option<broadcast::Receiver<RoomEvent>>,
    muted: bool,
    agent_phase: String,
    error: Option<String>,
    revision_tx: watch::Sender<u64>,
}

impl<R: RealtimeSession> SessionController<R> {
    /// Creates a controller that requests credentials from `config.token_url`.
    pub fn new(config: ClientConfig, room: R) -> Result<Self, VoiceError> {
        let gateway = TokenGateway::new(&config.token_url)?;
        Ok(Self::with_gateway(config, gateway, room))
    }

    pub fn with_gateway(config: ClientConfig, gateway: TokenGateway, room: R) -> Self {
        let transcript = Transcript::new(config.agent_marker.clone());
        let (revision_tx, _) = watch::channel(0);
        Self {
            config,
            gateway,
            room,
            transcript,
            state: ConnectionState::Disconnected,
            credential: None,
            events: None,
            muted: false,
            agent_phase: AgentPhase::Connecting.as_str().to_string(),
            error: None,
            revision_tx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn credential(&self) -> Option<&SessionCredential> {
        self.credential.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn room(&self) -> &R {
        &self.room
    }

    /// Last user-facing error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Subscribes to render notifications. The value is a revision counter
    /// bumped on every observable change; read the state with [`Self::view`].
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            state: self.state,
            muted: self.muted,
            agent_phase: &self.agent_phase,
            display: project(AgentPhase::parse(&self.agent_phase)),
            messages: self.transcript.messages(),
            error: self.error.as_deref(),
            room: self.credential.as_ref().map(|c| c.room.as_str()),
        }
    }

    fn changed(&self) {
        self.revision_tx.send_modify(|rev| *rev += 1);
    }

    /// Requests a credential and joins a fresh room.
    ///
    /// On failure the controller is back in `Disconnected` with one inline
    /// error message set, and the error is returned.
    pub async fn connect(&mut self) -> Result<(), VoiceError> {
        // `&mut self` means no other attempt can still be running, so a
        // leftover `Connecting` is one whose future was dropped.
        if self.state == ConnectionState::Connecting {
            warn!("previous connect attempt was abandoned, discarding it");
            if let Err(e) = self.room.disconnect().await {
                debug!(error = %e, "abandoned attempt had no room to leave");
            }
            self.state = ConnectionState::Disconnected;
            self.credential = None;
            self.events = None;
        }
        if self.state != ConnectionState::Disconnected {
            warn!(state = ?self.state, "connect ignored, session already active");
            return Err(VoiceError::Busy);
        }

        self.state = ConnectionState::Connecting;
        self.error = None;
        self.changed();

        let room_name = generate_room_name(&self.config.room_prefix);
        let identity = generate_identity(&self.config.identity_prefix);
        info!(room = %room_name, %identity, "connecting voice session");

        match self.establish(&room_name, &identity).await {
            Ok(credential) => {
                info!(room = %credential.room, "voice session connected");
                self.credential = Some(credential);
                self.state = ConnectionState::Connected;
                self.muted = false;
                self.changed();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, room = %room_name, "voice session failed to connect");
                self.state = ConnectionState::Disconnected;
                self.credential = None;
                self.events = None;
                self.error = Some(e.user_message());
                self.changed();
                Err(e)
            }
        }
    }

    async fn establish(
        &mut self,
        room_name: &str,
        identity: &str,
    ) -> Result<SessionCredential, VoiceError> {
        let credential = self.gateway.fetch_token(room_name, identity).await?;
        // Subscribe first so nothing emitted during the handshake is lost.
        let events = self.room.subscribe();
        self.room
            .connect(&self.config.livekit_url, &credential.token)
            .await?;
        self.events = Some(events);
        Ok(credential)
    }

    /// Leaves the room and discards the session.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        if let Err(e) = self.room.disconnect().await {
            warn!(error = %e, "room disconnect failed, discarding session anyway");
        }
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        info!(messages = self.transcript.len(), "voice session closed");
        self.state = ConnectionState::Disconnected;
        self.credential = None;
        self.events = None;
        self.muted = false;
        self.agent_phase = AgentPhase::Connecting.as_str().to_string();
        self.transcript.reset();
        self.changed();
    }

    /// Flips the mute flag and applies it to the session's microphone.
    ///
    /// The flag flips before the session acknowledges. If the session
    /// refuses, it is rolled back and [`VoiceError::Microphone`] is returned.
    /// Returns the new muted state on success.
    pub async fn toggle_mic(&mut self) -> Result<bool, VoiceError> {
        if self.state != ConnectionState::Connected {
            return Err(VoiceError::Microphone("no active session".to_string()));
        }

        let muted = !self.muted;
        self.muted = muted;
        self.changed();

        match self.room.set_microphone_enabled(!muted).await {
            Ok(()) => {
                debug!(muted, "microphone updated");
                Ok(muted)
            }
            Err(e) => {
                let e = match e {
                    VoiceError::Microphone(_) => e,
                    other => VoiceError::Microphone(other.to_string()),
                };
                warn!(error = %e, "microphone toggle rejected, rolling back");
                self.muted = !muted;
                self.error = Some(e.user_message());
                self.changed();
                Err(e)
            }
        }
    }

    /// Routes one room event.
    pub async fn handle_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Transcription {
                segments,
                participant,
            } => {
                if self.state != ConnectionState::Connected {
                    debug!("dropping transcription outside a session");
                    return;
                }
                let summary = self.transcript.ingest(
                    &segments,
                    TranscriptChannel::Primary,
                    participant.as_ref(),
                );
                if summary.changed() {
                    self.changed();
                }
            }
            RoomEvent::AgentTranscriptions(segments) => {
                if self.state != ConnectionState::Connected {
                    debug!("dropping agent transcriptions outside a session");
                    return;
                }
                let summary =
                    self.transcript
                        .ingest(&segments, TranscriptChannel::Secondary, None);
                if summary.changed() {
                    self.changed();
                }
            }
            RoomEvent::AgentPhaseChanged(phase) => {
                if self.state != ConnectionState::Connected || phase == self.agent_phase {
                    return;
                }
                debug!(%phase, "agent phase changed");
                self.agent_phase = phase;
                self.changed();
            }
            RoomEvent::Disconnected { reason } => {
                info!(%reason, "session ended by remote");
                self.teardown();
            }
            RoomEvent::Error(detail) => {
                warn!(%detail, "realtime session error");
                self.error = Some(VoiceError::Session(detail).user_message());
                if self.state == ConnectionState::Disconnected {
                    self.changed();
                    return;
                }
                if let Err(e) = self.room.disconnect().await {
                    warn!(error = %e, "room disconnect after error failed");
                }
                self.teardown();
            }
        }
    }

    /// Waits for the next room event. Returns `None` when there is no live
    /// session or the event source is gone.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        let events = self.events.as_mut()?;
        loop {
            match events.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "room event receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Handles one event if any is available. Returns `false` once the event
    /// source is gone.
    pub async fn pump(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }
}
