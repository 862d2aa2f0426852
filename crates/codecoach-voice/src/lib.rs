//! Voice session plumbing for the CodeCoach client.
//!
//! Everything between the transcript engine and the network lives here:
//!
//! - [`TokenGateway`] exchanges a room and identity for a signed session
//!   credential over HTTP (`POST /token`).
//! - [`TokenIssuer`] is the other side of that exchange: it signs LiveKit
//!   join tokens from an API key and secret.
//! - [`RealtimeSession`] is the seam to the realtime transport. The client only
//!   needs connect/disconnect, a microphone switch, and an event stream of
//!   [`RoomEvent`]s. [`LoopbackRoom`] is an in-process implementation.

pub mod config;
pub mod error;
pub mod gateway;
pub mod issuer;
pub mod room;

pub use config::{LiveKitConfig, DEV_LIVEKIT_API_KEY, DEV_LIVEKIT_API_SECRET, DEV_LIVEKIT_URL};
pub use error::VoiceError;
pub use gateway::{SessionCredential, TokenGateway};
pub use issuer::TokenIssuer;
pub use room::{LoopbackRoom, RealtimeSession, RoomEvent};
