use crate::error::VoiceError;
use codecoach_types::{ParticipantRef, Segment};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::info;

/// Default capacity for the room event broadcast channel.
const DEFAULT_ROOM_EVENT_BROADCAST_CAPACITY: usize = 256;

/// Something the realtime session reports to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Room-wide transcription batch, optionally attributed to a participant.
    Transcription {
        segments: Vec<Segment>,
        participant: Option<ParticipantRef>,
    },
    /// A batch from the agent's own transcription feed.
    AgentTranscriptions(Vec<Segment>),
    /// The agent moved to a new turn-taking phase.
    AgentPhaseChanged(String),
    /// The session ended on the remote side.
    Disconnected { reason: String },
    /// The transport failed.
    Error(String),
}

/// The realtime transport as seen by the session controller.
///
/// All methods that talk to the transport may suspend. Events are delivered on
/// a broadcast channel; subscribe before connecting to see every event.
pub trait RealtimeSession {
    /// Joins the room at `url` using `token`.
    fn connect(
        &mut self,
        url: &str,
        token: &str,
    ) -> impl Future<Output = Result<(), VoiceError>> + Send;

    /// Leaves the room.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), VoiceError>> + Send;

    /// Enables or disables the local microphone track. Resolves once the
    /// transport has applied the change.
    fn set_microphone_enabled(
        &mut self,
        enabled: bool,
    ) -> impl Future<Output = Result<(), VoiceError>> + Send;

    /// Returns a receiver for room events.
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent>;
}

#[derive(Debug, Default)]
struct LoopbackState {
    connected: bool,
    microphone_enabled: bool,
    url: Option<String>,
    token: Option<String>,
    connect_failure: Option<String>,
    microphone_failure: Option<String>,
}

/// An in-process room.
///
/// Nothing leaves the process: events are injected with [`LoopbackRoom::emit`]
/// and delivered to subscribers as if the transport had produced them. Clones
/// share state, so a caller can keep a handle after moving one into a
/// controller.
///
/// Uses `std::sync::Mutex`: every lock is a short field update and never
/// spans an `.await`.
#[derive(Debug, Clone)]
pub struct LoopbackRoom {
    state: Arc<Mutex<LoopbackState>>,
    events_tx: broadcast::Sender<RoomEvent>,
}

impl Default for LoopbackRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackRoom {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(DEFAULT_ROOM_EVENT_BROADCAST_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(LoopbackState::default())),
            events_tx,
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LoopbackState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn is_connected(&self) -> bool {
        self.with_state(|s| s.connected)
    }

    pub fn microphone_enabled(&self) -> bool {
        self.with_state(|s| s.microphone_enabled)
    }

    /// URL passed to the last successful connect.
    pub fn url(&self) -> Option<String> {
        self.with_state(|s| s.url.clone())
    }

    /// Token passed to the last successful connect.
    pub fn token(&self) -> Option<String> {
        self.with_state(|s| s.token.clone())
    }

    /// Makes the next `connect` fail with `reason`.
    pub fn fail_next_connect(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.with_state(|s| s.connect_failure = Some(reason));
    }

    /// Makes every microphone change fail with `reason` until cleared.
    pub fn fail_microphone(&self, reason: Option<String>) {
        self.with_state(|s| s.microphone_failure = reason);
    }

    /// Delivers `event` to every subscriber. Returns the number of receivers.
    pub fn emit(&self, event: RoomEvent) -> Result<usize, VoiceError> {
        if !self.is_connected() {
            return Err(VoiceError::Session(
                "loopback room is not connected".to_string(),
            ));
        }
        // No receivers is not an error for the transport.
        Ok(self.events_tx.send(event).unwrap_or(0))
    }

    /// Ends the session from the remote side.
    pub fn end_session(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let was_connected = self.with_state(|s| std::mem::replace(&mut s.connected, false));
        if was_connected {
            info!(%reason, "loopback room ended by remote");
            let _ = self.events_tx.send(RoomEvent::Disconnected { reason });
        }
    }
}

impl RealtimeSession for LoopbackRoom {
    async fn connect(&mut self, url: &str, token: &str) -> Result<(), VoiceError> {
        info!(url, token_len = token.len(), "loopback room connecting");
        tokio::task::yield_now().await;

        self.with_state(|s| {
            if let Some(reason) = s.connect_failure.take() {
                return Err(VoiceError::Session(reason));
            }
            s.connected = true;
            s.microphone_enabled = true;
            s.url = Some(url.to_string());
            s.token = Some(token.to_string());
            Ok(())
        })
    }

    async fn disconnect(&mut self) -> Result<(), VoiceError> {
        self.with_state(|s| {
            if s.connected {
                info!("loopback room disconnecting");
            }
            s.connected = false;
            s.microphone_enabled = false;
        });
        Ok(())
    }

    async fn set_microphone_enabled(&mut self, enabled: bool) -> Result<(), VoiceError> {
        tokio::task::yield_now().await;

        self.with_state(|s| {
            if !s.connected {
                return Err(VoiceError::Microphone("not connected".to_string()));
            }
            if let Some(reason) = &s.microphone_failure {
                return Err(VoiceError::Microphone(reason.clone()));
            }
            s.microphone_enabled = enabled;
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events_tx.subscribe()
    }
}
