//! # Playback Coordination Module
//!
//! Drives audio playback on top of a host-owned media engine.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback state machine ([`PlaybackCoordinator`])
//! - System audio focus, including delayed grants and ducking ([`AudioFocusArbiter`])
//! - Keep-alive lock and noisy-route registration ([`ResourceGuard`])
//! - Engine lifecycle and stale-event filtering ([`MediaEngineAdapter`])
//! - State, queue, action, position and error channels ([`StateObserverHub`])
//! - Notification policy and the session facade ([`PlayerSession`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlayerSession};
//!
//! let session = PlayerSession::start(&core_config, PlaybackConfig::default())?;
//! let mut state = session.hub().subscribe_state();
//! session.play(Some(track))?;
//! ```

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod focus;
pub mod hub;
pub mod notification;
pub mod resources;
pub mod session;
pub mod state;

pub use config::PlaybackConfig;
pub use coordinator::PlaybackCoordinator;
pub use engine::{EngineEventSink, MediaEngineAdapter};
pub use error::{PlaybackError, Result};
pub use focus::{AudioFocusArbiter, FocusIntent, FocusOutcome, FocusState};
pub use hub::{ErrorEvent, PositionUpdate, StateObserverHub};
pub use notification::{
    action_for_button, directive_for, NotificationButton, NotificationContent,
    NotificationDirective, NotificationRenderer,
};
pub use resources::{GuardState, ResourceGuard};
pub use session::PlayerSession;
pub use state::{Action, Media, PlaybackState, QueueData, StateIdentity, StateKind};
