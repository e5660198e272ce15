//! # Playback Error Types
//!
//! Errors returned by the coordinator, the engine adapter and the arbiter.

use bridge_traits::BridgeError;
use thiserror::Error;

use crate::state::StateKind;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Decode or network failure reported by the media engine.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Transport call on an adapter whose engine was already released.
    #[error("Media engine already released")]
    EngineReleased,

    // ========================================================================
    // Control Errors
    // ========================================================================
    /// The platform refused audio focus. State is left unchanged.
    #[error("Audio focus request denied")]
    FocusDenied,

    /// Command issued against a session that can no longer accept it.
    #[error("Cannot {command} while {state:?}")]
    InvalidTransition {
        command: &'static str,
        state: StateKind,
    },

    /// `pause`, `resume` or `seek_to` with nothing loaded.
    #[error("No media loaded")]
    NoMediaLoaded,

    /// Configuration value out of range.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Platform Errors
    // ========================================================================
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// The session is over; only a new `PlayerSession` can play again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PlaybackError::EngineReleased | PlaybackError::InvalidTransition { .. }
        )
    }

    /// The command can be retried later without host intervention.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlaybackError::Engine(_) | PlaybackError::FocusDenied | PlaybackError::NoMediaLoaded => {
                true
            }
            PlaybackError::Bridge(err) => err.is_benign(),
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = PlaybackError::InvalidTransition {
            command: "play",
            state: StateKind::Stopped,
        };
        assert_eq!(err.to_string(), "Cannot play while Stopped");
        assert!(err.is_terminal());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_classification() {
        assert!(PlaybackError::FocusDenied.is_recoverable());
        assert!(PlaybackError::Engine("404".into()).is_recoverable());
        assert!(PlaybackError::EngineReleased.is_terminal());
        assert!(PlaybackError::Bridge(BridgeError::NotRegistered("noisy".into())).is_recoverable());
        assert!(!PlaybackError::Bridge(BridgeError::OperationFailed("jni".into())).is_recoverable());
    }
}
