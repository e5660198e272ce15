//! # Player Session
//!
//! One lifetime of a media engine, from [`PlayerSession::start`] to
//! [`PlayerSession::stop`].
//!
//! ## Overview
//!
//! The session wires the host bridges from a [`CoreConfig`] into a
//! [`PlaybackCoordinator`] and owns the background work around it:
//! - a position ticker sampling the engine while playing
//! - an optional notification renderer driven by the state and queue channels
//!
//! Both run on the tokio runtime that called `start`. The ticker ends with
//! `stop`; the renderer ends after drawing the `Stopped` state, or when the
//! session is dropped.
//!
//! ## Usage
//!
//! ```ignore
//! let core = CoreConfig::builder()
//!     .engine_factory(Arc::new(ExoPlayerFactory::new(ctx)))
//!     .focus_provider(Arc::new(AndroidAudioFocus::new(ctx)))
//!     .build()?;
//!
//! let session = PlayerSession::start(&core, PlaybackConfig::default())?;
//! session.set_queue(QueueData::new(tracks, 0));
//! session.play(None)?;
//! ```

use core_runtime::config::CoreConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::PlaybackConfig;
use crate::coordinator::PlaybackCoordinator;
use crate::error::{PlaybackError, Result};
use crate::hub::StateObserverHub;
use crate::notification::{
    action_for_button, directive_for, NotificationContent, NotificationRenderer,
};
use crate::state::{Action, Media, PlaybackState, QueueData};

pub struct PlayerSession {
    coordinator: PlaybackCoordinator,
    runtime: Handle,
    /// Cancelled when the session is dropped.
    shutdown: CancellationToken,
    /// Cancelled on `stop`.
    ticker: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl PlayerSession {
    /// Build a session from the host bridges and start its position ticker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(core: &CoreConfig, config: PlaybackConfig) -> Result<Self> {
        core.validate()?;
        let runtime = Handle::try_current().map_err(|_| {
            core_runtime::Error::Internal(
                "PlayerSession::start must be called from a tokio runtime".to_string(),
            )
        })?;

        let interval = config.position_tick_interval;
        let coordinator = PlaybackCoordinator::from_config(core, config)?;
        let shutdown = CancellationToken::new();
        let ticker = shutdown.child_token();

        let session = Self {
            coordinator,
            runtime,
            shutdown,
            ticker,
            tasks: Mutex::new(Vec::new()),
        };
        session.spawn_ticker(interval);
        info!(features = ?core.features, "Player session started");
        Ok(session)
    }

    fn spawn_ticker(&self, period: Duration) {
        let coordinator = self.coordinator.clone();
        let token = self.ticker.clone();

        let handle = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if coordinator.is_stopped() {
                            break;
                        }
                        coordinator.sample_position();
                    }
                }
            }
            debug!("Position ticker finished");
        });
        self.tasks.lock().push(handle);
    }

    /// Render the notification on every state or queue change.
    ///
    /// The current state is rendered immediately.
    pub fn attach_renderer(&self, renderer: Arc<dyn NotificationRenderer>) {
        let hub = self.coordinator.hub().clone();
        let token = self.shutdown.clone();

        let handle = self.runtime.spawn(async move {
            let mut states = hub.subscribe_state();
            let mut queues = hub.subscribe_queue();
            loop {
                let state = states.borrow_and_update().clone();
                let queue = queues.borrow_and_update().clone();
                let content = NotificationContent::for_state(&state, &queue);
                renderer.render(directive_for(&state), content);
                if state.is_stopped() {
                    break;
                }

                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = states.changed() => if changed.is_err() { break },
                    changed = queues.changed() => if changed.is_err() { break },
                }
            }
            debug!("Notification renderer finished");
        });
        self.tasks.lock().push(handle);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn play(&self, media: Option<Media>) -> Result<()> {
        self.coordinator.play(media)
    }

    pub fn pause(&self) -> Result<()> {
        self.coordinator.pause()
    }

    pub fn resume(&self) -> Result<()> {
        self.coordinator.resume()
    }

    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.coordinator.seek_to(position)
    }

    /// Stop playback and end the session. Calling it again is a no-op.
    pub fn stop(&self) -> Result<()> {
        let result = self.coordinator.stop();
        self.ticker.cancel();
        result
    }

    pub fn set_queue(&self, queue: QueueData) {
        debug!(len = queue.len(), index = queue.index, "Queue replaced");
        self.coordinator.hub().publish_queue(queue);
    }

    /// Play the next queue item. A no-op at the end of the queue.
    pub fn skip_next(&self) -> Result<()> {
        let queue = self.coordinator.hub().current_queue();
        self.skip_to(queue, |q| q.index.checked_add(1))
    }

    /// Play the previous queue item. A no-op at the start of the queue.
    pub fn skip_previous(&self) -> Result<()> {
        let queue = self.coordinator.hub().current_queue();
        self.skip_to(queue, |q| q.index.checked_sub(1))
    }

    fn skip_to(&self, queue: QueueData, target: impl Fn(&QueueData) -> Option<usize>) -> Result<()> {
        let Some(next) = target(&queue).and_then(|index| queue.with_index(index)) else {
            debug!(index = queue.index, len = queue.len(), "Nothing to skip to");
            return Ok(());
        };
        let media = next.current().cloned().ok_or(PlaybackError::NoMediaLoaded)?;
        self.coordinator.play(Some(media))?;
        self.coordinator.hub().publish_queue(next);
        Ok(())
    }

    /// Broadcast `action` to observers and execute it.
    #[instrument(skip(self), fields(action = action.name()))]
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.coordinator.hub().emit_action(action.clone());
        match action {
            Action::Play(media) => self.play(media),
            Action::Pause => self.pause(),
            Action::Resume => self.resume(),
            Action::Stop => self.stop(),
            Action::SeekTo(position) => self.seek_to(position),
            Action::SkipNext => self.skip_next(),
            Action::SkipPrevious => self.skip_previous(),
        }
    }

    /// Handle a notification button press reported by the host.
    pub fn press_button(&self, id: &str) -> Result<()> {
        match action_for_button(id) {
            Some(action) => self.dispatch(action),
            None => {
                warn!(button = id, "Ignoring unknown notification button");
                Ok(())
            }
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.coordinator.state()
    }

    pub fn hub(&self) -> &StateObserverHub {
        self.coordinator.hub()
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if !self.coordinator.is_stopped() {
            if let Err(err) = self.coordinator.stop() {
                warn!(error = %err, "Failed to stop dropped session");
            }
        }
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("coordinator", &self.coordinator)
            .field("tasks", &self.tasks.lock().len())
            .finish()
    }
}
