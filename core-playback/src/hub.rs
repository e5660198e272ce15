//! # State Observer Hub
//!
//! Fan-out point between the coordinator and everything that renders or
//! records playback: notification, UI, analytics.
//!
//! ## Channels
//!
//! | Channel   | Kind          | Replay | Dedup               |
//! |-----------|---------------|--------|---------------------|
//! | state     | `StateChannel`| latest | variant + media id  |
//! | queue     | `StateChannel`| latest | none                |
//! | actions   | `EventBus`    | none   | none                |
//! | positions | `EventBus`    | none   | none                |
//! | errors    | `EventBus`    | none   | none                |
//!
//! The state channel always stores the newest state (position included) but
//! only wakes subscribers when the [`StateIdentity`](crate::StateIdentity)
//! changes. Position travels on its own channel.
//!
//! ## Usage
//!
//! ```ignore
//! let hub = session.hub();
//! let mut state = hub.subscribe_state();
//! tokio::spawn(async move {
//!     while state.changed().await.is_ok() {
//!         let current = state.borrow_and_update().clone();
//!         render(current);
//!     }
//! });
//! ```

use core_runtime::events::{EventBus, EventStream, StateChannel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::error::PlaybackError;
use crate::state::{Action, PlaybackState, QueueData};

/// Position sample published while playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub media_id: String,
    pub position: Duration,
    pub duration: Option<Duration>,
}

/// Side-channel report of a failure that did not change the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub media_id: Option<String>,
    pub message: String,
    pub recoverable: bool,
}

impl ErrorEvent {
    pub fn from_error(error: &PlaybackError, media_id: Option<String>) -> Self {
        Self {
            media_id,
            message: error.to_string(),
            recoverable: error.is_recoverable(),
        }
    }
}

/// Cloneable handle; every clone reads from the same channels.
///
/// Observers may replace the queue and emit actions. State, positions and
/// errors are written only by the coordinator.
///
/// ```compile_fail
/// let hub = core_playback::StateObserverHub::default();
/// hub.publish_state(core_playback::PlaybackState::Idle);
/// ```
#[derive(Clone, Debug)]
pub struct StateObserverHub {
    state: Arc<StateChannel<PlaybackState>>,
    queue: Arc<StateChannel<QueueData>>,
    actions: EventBus<Action>,
    positions: EventBus<PositionUpdate>,
    errors: EventBus<ErrorEvent>,
}

impl StateObserverHub {
    pub fn new(event_capacity: usize) -> Self {
        Self {
            state: Arc::new(StateChannel::new(PlaybackState::Idle)),
            queue: Arc::new(StateChannel::new(QueueData::default())),
            actions: EventBus::new(event_capacity),
            positions: EventBus::new(event_capacity),
            errors: EventBus::new(event_capacity),
        }
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Store `state`; subscribers wake only on an identity change.
    pub(crate) fn publish_state(&self, state: PlaybackState) -> bool {
        self.state
            .publish_if(state, |current, next| !current.same_identity(next))
    }

    pub fn current_state(&self) -> PlaybackState {
        self.state.current()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    // ------------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------------

    pub fn publish_queue(&self, queue: QueueData) {
        self.queue.publish(queue);
    }

    pub fn current_queue(&self) -> QueueData {
        self.queue.current()
    }

    pub fn subscribe_queue(&self) -> watch::Receiver<QueueData> {
        self.queue.subscribe()
    }

    // ------------------------------------------------------------------------
    // One-shot channels
    // ------------------------------------------------------------------------

    /// Returns false when nobody is listening.
    pub fn emit_action(&self, action: Action) -> bool {
        self.actions.emit(action).is_ok()
    }

    pub fn subscribe_actions(&self) -> EventStream<Action> {
        self.actions.stream()
    }

    pub(crate) fn publish_position(&self, update: PositionUpdate) -> bool {
        self.positions.emit(update).is_ok()
    }

    pub fn subscribe_positions(&self) -> EventStream<PositionUpdate> {
        self.positions.stream()
    }

    pub(crate) fn publish_error(&self, event: ErrorEvent) -> bool {
        self.errors.emit(event).is_ok()
    }

    pub fn subscribe_errors(&self) -> EventStream<ErrorEvent> {
        self.errors.stream()
    }
}

impl Default for StateObserverHub {
    fn default() -> Self {
        Self::new(core_runtime::events::DEFAULT_EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Media;

    fn media(id: &str) -> Media {
        Media::new(id, id, "artist", format!("https://cdn/{id}.mp3"))
    }

    #[tokio::test]
    async fn test_state_replays_latest_to_late_subscriber() {
        let hub = StateObserverHub::default();
        hub.publish_state(PlaybackState::Buffering {
            media: media("a"),
            position: Duration::ZERO,
        });

        let rx = hub.subscribe_state();
        assert!(matches!(*rx.borrow(), PlaybackState::Buffering { .. }));
    }

    #[tokio::test]
    async fn test_position_only_change_does_not_wake_subscribers() {
        let hub = StateObserverHub::default();
        let mut rx = hub.subscribe_state();

        assert!(hub.publish_state(PlaybackState::Playing {
            media: media("a"),
            position: Duration::from_secs(1),
        }));
        rx.borrow_and_update();

        assert!(!hub.publish_state(PlaybackState::Playing {
            media: media("a"),
            position: Duration::from_secs(2),
        }));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(hub.current_state().position(), Duration::from_secs(2));

        assert!(hub.publish_state(PlaybackState::Playing {
            media: media("b"),
            position: Duration::ZERO,
        }));
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_actions_are_not_replayed() {
        let hub = StateObserverHub::default();
        assert!(!hub.emit_action(Action::Pause));

        let mut actions = hub.subscribe_actions();
        assert!(actions.try_recv().is_none());
        assert!(hub.emit_action(Action::SkipNext));
        assert_eq!(actions.recv().await.unwrap(), Action::SkipNext);
    }

    #[tokio::test]
    async fn test_queue_replays_latest() {
        let hub = StateObserverHub::default();
        hub.publish_queue(QueueData::new(vec![media("a"), media("b")], 1));
        assert_eq!(hub.subscribe_queue().borrow().current().unwrap().id, "b");
    }

    #[test]
    fn test_error_event_from_error() {
        let event = ErrorEvent::from_error(&PlaybackError::Engine("404".into()), Some("a".into()));
        assert_eq!(event.message, "Engine error: 404");
        assert!(event.recoverable);
    }
}
