//! CodeCoach voice client.
//!
//! Ties the pieces together for a user-facing session: configuration, the
//! [`SessionController`] that drives connect/mute/disconnect and routes room
//! events into the transcript, the phase [`projector`], and a plain-text
//! [`render`] of the resulting state.
//!
//! ```rust,ignore
//! use codecoach_client::{config, render, SessionController};
//! use codecoach_voice::LoopbackRoom;
//!
//! let config = config::load_config(Some("codecoach.toml"))?;
//! let mut controller = SessionController::new(config, LoopbackRoom::new())?;
//! controller.connect().await?;
//! while controller.pump().await {
//!     print!("{}", render(&controller.view()));
//! }
//! ```

pub mod config;
pub mod controller;
pub mod projector;
pub mod render;

pub use config::{load_config, ClientConfig, ConfigError};
pub use controller::{ConnectionState, SessionController, SessionView};
pub use projector::{project, DisplayState};
pub use render::render;
