//! # Playback Coordinator
//!
//! Owns the authoritative [`PlaybackState`] and drives every transition.
//!
//! ## Overview
//!
//! Inputs come from three directions, each on threads the coordinator does
//! not control:
//! - user commands (`play`, `pause`, `resume`, `stop`, `seek_to`)
//! - media engine events
//! - audio focus and route-change callbacks from the platform
//!
//! ## Serialization
//!
//! All state lives behind one mutex and every input is handled inside one
//! critical section. Callbacks never block on that mutex: they push onto an
//! inbox and try to take the lock. If the lock is busy, the thread holding
//! it drains the inbox before releasing it and checks the inbox again right
//! after. A callback fired synchronously from inside an engine or platform
//! call made under the lock is therefore processed right after the current
//! transition, on the same thread, without deadlock.
//!
//! Commands do wait for the lock, since they return a result. The lock is
//! only ever held for non-blocking bridge calls.
//!
//! ## Transitions
//!
//! ```text
//! Idle ──play──> Buffering ──engine──> Playing <──> Paused
//!                                         │           │
//!                                         └─> Completed <┘
//! any ──stop──> Stopped (terminal)
//! ```

use bridge_traits::{EngineEvent, FocusChange, FocusChangeListener, RouteChangeListener};
use core_runtime::config::CoreConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use crate::config::PlaybackConfig;
use crate::engine::{EngineEventSink, MediaEngineAdapter};
use crate::error::{PlaybackError, Result};
use crate::focus::{AudioFocusArbiter, FocusIntent, FocusOutcome, FocusState};
use crate::hub::{ErrorEvent, PositionUpdate, StateObserverHub};
use crate::resources::{GuardState, ResourceGuard};
use crate::state::{Media, PlaybackState, StateKind};

const FULL_VOLUME: f32 = 1.0;

/// Input delivered by a platform or engine callback.
#[derive(Debug)]
enum Input {
    Engine { generation: u64, event: EngineEvent },
    Focus(FocusChange),
    BecomingNoisy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseReason {
    User,
    FocusLoss,
    NoisyRoute,
}

/// State guarded by the coordinator lock.
#[derive(Debug, Default)]
struct Core {
    state: PlaybackState,
    /// Media waiting for a delayed focus grant.
    pending: Option<Media>,
    /// Engine volume lowered for another app.
    ducked: bool,
}

impl Core {
    /// Media that `play(None)`, `pause` and `seek_to` act on. Completed media
    /// is no longer current.
    fn loaded_media(&self) -> Option<&Media> {
        match &self.state {
            PlaybackState::Buffering { media, .. }
            | PlaybackState::Playing { media, .. }
            | PlaybackState::Paused { media, .. } => Some(media),
            _ => None,
        }
    }

    fn is_rendering(&self) -> bool {
        matches!(self.state.kind(), StateKind::Playing | StateKind::Buffering)
    }
}

/// Forwards platform and engine callbacks into the coordinator inbox.
///
/// Holds the coordinator weakly so bridges keeping a listener alive never
/// keep the coordinator alive.
struct Callbacks {
    inner: Weak<Inner>,
}

impl Callbacks {
    fn submit(&self, input: Input) {
        match self.inner.upgrade() {
            Some(inner) => inner.submit(input),
            None => debug!(?input, "Callback after coordinator dropped"),
        }
    }
}

impl FocusChangeListener for Callbacks {
    fn on_focus_change(&self, change: FocusChange) {
        self.submit(Input::Focus(change));
    }
}

impl RouteChangeListener for Callbacks {
    fn on_becoming_noisy(&self) {
        self.submit(Input::BecomingNoisy);
    }
}

impl EngineEventSink for Callbacks {
    fn on_engine_event(&self, generation: u64, event: EngineEvent) {
        self.submit(Input::Engine { generation, event });
    }
}

struct Inner {
    core: Mutex<Core>,
    inbox: Mutex<VecDeque<Input>>,
    stopped: AtomicBool,
    engine: MediaEngineAdapter,
    arbiter: AudioFocusArbiter,
    guard: ResourceGuard,
    hub: StateObserverHub,
    config: PlaybackConfig,
    callbacks: Arc<Callbacks>,
}

/// The playback state machine. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<Inner>,
}

impl PlaybackCoordinator {
    pub fn new(
        engine: MediaEngineAdapter,
        arbiter: AudioFocusArbiter,
        guard: ResourceGuard,
        hub: StateObserverHub,
        config: PlaybackConfig,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak| Inner {
            core: Mutex::new(Core::default()),
            inbox: Mutex::new(VecDeque::new()),
            stopped: AtomicBool::new(false),
            engine,
            arbiter,
            guard,
            hub,
            config,
            callbacks: Arc::new(Callbacks {
                inner: weak.clone(),
            }),
        });
        inner.hub.publish_state(PlaybackState::Idle);
        Self { inner }
    }

    /// Wire a coordinator from the host bridges in `core`.
    ///
    /// Creates a fresh engine through the configured factory.
    pub fn from_config(core: &CoreConfig, config: PlaybackConfig) -> Result<Self> {
        config.validate()?;

        let engine = MediaEngineAdapter::new(core.engine_factory.create()?);
        let request = config.focus_request();
        let arbiter = if core.features.request_audio_focus {
            AudioFocusArbiter::new(Arc::clone(&core.focus_provider), request)
        } else {
            AudioFocusArbiter::disabled(Arc::clone(&core.focus_provider), request)
        };
        let guard = ResourceGuard::new(
            Arc::clone(&core.keep_alive_lock),
            Arc::clone(&core.route_monitor),
        )
        .with_keep_alive(core.features.hold_keep_alive_lock)
        .with_route_watch(core.features.pause_on_noisy_route);
        let hub = StateObserverHub::new(config.hub_event_capacity);

        Ok(Self::new(engine, arbiter, guard, hub, config))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Play `media`, or resume the current media when `None`.
    ///
    /// Playing the media that is already loaded resumes it in place.
    #[instrument(skip(self, media), fields(media_id = media.as_ref().map(|m| m.id.as_str())))]
    pub fn play(&self, media: Option<Media>) -> Result<()> {
        self.inner
            .command("play", |inner, core| inner.play(core, media))
    }

    #[instrument(skip(self))]
    pub fn pause(&self) -> Result<()> {
        self.inner
            .command("pause", |inner, core| inner.pause(core, PauseReason::User))
    }

    #[instrument(skip(self))]
    pub fn resume(&self) -> Result<()> {
        self.inner.command("resume", |inner, core| {
            let media = core
                .loaded_media()
                .or(core.pending.as_ref())
                .cloned()
                .ok_or(PlaybackError::NoMediaLoaded)?;
            inner.play(core, Some(media))
        })
    }

    /// Release focus, the engine and resources. Calling it again is a no-op.
    #[instrument(skip(self))]
    pub fn stop(&self) -> Result<()> {
        self.inner.command("stop", |inner, core| {
            inner.stop(core);
            Ok(())
        })
    }

    #[instrument(skip(self))]
    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.inner
            .command("seek_to", |inner, core| inner.seek_to(core, position))
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.inner.hub.current_state()
    }

    pub fn hub(&self) -> &StateObserverHub {
        &self.inner.hub
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }

    pub fn focus_state(&self) -> FocusState {
        self.inner.arbiter.state()
    }

    pub fn resources(&self) -> GuardState {
        self.inner.guard.state()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Sample the engine position and publish a tick while playing.
    ///
    /// Returns `None` in every other state, including after `stop`.
    pub fn sample_position(&self) -> Option<PositionUpdate> {
        if self.is_stopped() {
            return None;
        }
        let update = {
            let mut core = self.inner.core.lock();
            let update = self.inner.sample_position(&mut core);
            self.inner.drain_locked(&mut core);
            update
        };
        self.inner.drain();
        update
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("state", &self.state().kind())
            .field("focus", &self.focus_state())
            .field("resources", &self.resources())
            .field("engine", &self.inner.engine)
            .finish()
    }
}

// ============================================================================
// Executor
// ============================================================================

impl Inner {
    fn focus_listener(&self) -> Arc<dyn FocusChangeListener> {
        self.callbacks.clone()
    }

    fn route_listener(&self) -> Arc<dyn RouteChangeListener> {
        self.callbacks.clone()
    }

    fn engine_sink(&self) -> Weak<dyn EngineEventSink> {
        let sink: Arc<dyn EngineEventSink> = self.callbacks.clone();
        Arc::downgrade(&sink)
    }

    fn submit(&self, input: Input) {
        self.inbox.lock().push_back(input);
        self.drain();
    }

    /// Process queued inputs unless another thread holds the state lock.
    fn drain(&self) {
        loop {
            let Some(mut core) = self.core.try_lock() else {
                return;
            };
            self.drain_locked(&mut core);
            drop(core);

            // An input may have been queued after the last pop but before
            // the unlock, by a thread whose try_lock failed.
            if self.inbox.lock().is_empty() {
                return;
            }
        }
    }

    fn drain_locked(&self, core: &mut Core) {
        loop {
            // The inbox lock must not be held while handling: handlers call
            // into bridges that may call back synchronously.
            let next = self.inbox.lock().pop_front();
            let Some(input) = next else {
                return;
            };
            self.handle(core, input);
        }
    }

    fn command<R>(
        &self,
        name: &'static str,
        f: impl FnOnce(&Inner, &mut Core) -> Result<R>,
    ) -> Result<R> {
        if name != "stop" && self.stopped.load(Ordering::SeqCst) {
            return Err(PlaybackError::InvalidTransition {
                command: name,
                state: StateKind::Stopped,
            });
        }

        let result = {
            let mut core = self.core.lock();
            let result = match core.state.kind() {
                StateKind::Stopped if name != "stop" => Err(PlaybackError::InvalidTransition {
                    command: name,
                    state: StateKind::Stopped,
                }),
                _ => f(self, &mut *core),
            };
            self.drain_locked(&mut core);
            result
        };
        self.drain();

        if let Err(err) = &result {
            debug!(command = name, error = %err, "Command rejected");
        }
        result
    }

    fn handle(&self, core: &mut Core, input: Input) {
        if core.state.is_stopped() {
            debug!(?input, "Dropping input after stop");
            return;
        }
        match input {
            Input::Engine { generation, event } => self.on_engine_event(core, generation, event),
            Input::Focus(change) => self.on_focus_change(core, change),
            Input::BecomingNoisy => self.on_becoming_noisy(core),
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn set_state(&self, core: &mut Core, next: PlaybackState) {
        let previous = core.state.kind();
        if previous != next.kind() {
            info!(
                from = %previous,
                to = %next.kind(),
                media_id = next.media().map(|m| m.id.as_str()),
                position_ms = next.position().as_millis() as u64,
                "Playback state transition"
            );
        }
        core.state = next.clone();
        self.hub.publish_state(next);
    }

    fn report(&self, error: &PlaybackError, media_id: Option<String>) {
        self.hub.publish_error(ErrorEvent::from_error(error, media_id));
    }

    fn acquire_resources(&self, core: &Core) {
        if let Err(err) = self.guard.acquire(&self.route_listener()) {
            warn!(error = %err, "Failed to acquire playback resources");
            self.report(&err, core.state.media().map(|m| m.id.clone()));
        }
    }

    fn release_resources(&self) {
        if let Err(err) = self.guard.release() {
            warn!(error = %err, "Failed to release playback resources");
        }
    }

    fn restore_volume(&self, core: &mut Core) {
        if core.ducked {
            core.ducked = false;
            if let Err(err) = self.engine.set_volume(FULL_VOLUME) {
                warn!(error = %err, "Failed to restore volume");
            }
        }
    }

    /// Engine position, never behind the last published position of the
    /// same media.
    fn clamped_position(&self, core: &Core, media: &Media) -> Duration {
        let engine = self.engine.position();
        match core.loaded_media() {
            Some(current) if current.is_same_item(media) => engine.max(core.state.position()),
            _ => engine,
        }
    }

    fn play(&self, core: &mut Core, media: Option<Media>) -> Result<()> {
        let target = media
            .or_else(|| core.loaded_media().cloned())
            .ok_or(PlaybackError::NoMediaLoaded)?;

        match self.arbiter.request_focus(self.focus_listener())? {
            FocusOutcome::Granted => self.start(core, target),
            FocusOutcome::Delayed => {
                info!(media_id = %target.id, "Focus grant delayed; waiting for gain");
                core.pending = Some(target);
                Ok(())
            }
            FocusOutcome::Denied => {
                warn!(media_id = %target.id, "Audio focus denied");
                let err = PlaybackError::FocusDenied;
                self.report(&err, Some(target.id));
                Err(err)
            }
        }
    }

    /// Start `target` with focus held.
    fn start(&self, core: &mut Core, target: Media) -> Result<()> {
        core.pending = None;
        self.restore_volume(core);

        let resuming = core
            .loaded_media()
            .is_some_and(|current| current.is_same_item(&target));

        if resuming {
            if let PlaybackState::Paused { media, position } = &core.state {
                let (media, position) = (media.clone(), *position);
                if let Err(err) = self.engine.resume() {
                    self.report(&err, Some(media.id));
                    return Err(err);
                }
                self.set_state(core, PlaybackState::Playing { media, position });
            }
            self.acquire_resources(core);
            return Ok(());
        }

        // A failed load has already invalidated the previous item's events,
        // so whatever was loaded before cannot be kept as the current media.
        if let Err(err) = self.engine.load_and_play(&target, self.engine_sink()) {
            warn!(media_id = %target.id, error = %err, "Failed to load media");
            self.release_resources();
            self.report(&err, Some(target.id));
            self.set_state(core, PlaybackState::Idle);
            return Err(err);
        }
        self.set_state(
            core,
            PlaybackState::Buffering {
                media: target,
                position: Duration::ZERO,
            },
        );
        self.acquire_resources(core);
        Ok(())
    }

    fn pause(&self, core: &mut Core, reason: PauseReason) -> Result<()> {
        if reason != PauseReason::FocusLoss {
            self.arbiter.cancel_pending_resume();
        }

        let media = match &core.state {
            PlaybackState::Buffering { media, .. } | PlaybackState::Playing { media, .. } => {
                media.clone()
            }
            PlaybackState::Paused { .. } => {
                // The engine may have paused on its own without releasing.
                self.release_resources();
                return Ok(());
            }
            _ => {
                return match core.pending.take() {
                    Some(pending) => {
                        debug!(media_id = %pending.id, "Dropped media waiting for focus");
                        Ok(())
                    }
                    None => Err(PlaybackError::NoMediaLoaded),
                };
            }
        };

        self.engine.pause()?;
        let position = self.clamped_position(core, &media);
        self.release_resources();
        debug!(?reason, "Paused");
        self.set_state(core, PlaybackState::Paused { media, position });
        Ok(())
    }

    fn stop(&self, core: &mut Core) {
        if core.state.is_stopped() {
            return;
        }

        let position = match core.loaded_media().cloned() {
            Some(media) => self.clamped_position(core, &media),
            None => core.state.position(),
        };
        core.pending = None;
        core.ducked = false;

        if let Err(err) = self.arbiter.release_focus() {
            warn!(error = %err, "Failed to release audio focus");
        }
        if let Err(err) = self.engine.release() {
            warn!(error = %err, "Failed to release media engine");
        }
        self.release_resources();

        self.stopped.store(true, Ordering::SeqCst);
        self.set_state(core, PlaybackState::Stopped { position });
    }

    fn seek_to(&self, core: &mut Core, position: Duration) -> Result<()> {
        let media = core
            .loaded_media()
            .cloned()
            .ok_or(PlaybackError::NoMediaLoaded)?;

        let duration = self.engine.duration();
        let target = duration.map_or(position, |d| position.min(d));
        self.engine.seek_to(target)?;

        if let Some(next) = PlaybackState::from_parts(core.state.kind(), Some(media.clone()), target)
        {
            self.set_state(core, next);
        }
        self.hub.publish_position(PositionUpdate {
            media_id: media.id,
            position: target,
            duration,
        });
        Ok(())
    }

    fn sample_position(&self, core: &mut Core) -> Option<PositionUpdate> {
        let PlaybackState::Playing { media, .. } = &core.state else {
            return None;
        };
        let media = media.clone();
        let position = self.clamped_position(core, &media);
        let update = PositionUpdate {
            media_id: media.id.clone(),
            position,
            duration: self.engine.duration(),
        };
        self.set_state(core, PlaybackState::Playing { media, position });
        self.hub.publish_position(update.clone());
        Some(update)
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    fn on_engine_event(&self, core: &mut Core, generation: u64, event: EngineEvent) {
        if !self.engine.is_current(generation) {
            debug!(generation, ?event, "Dropping engine event from an earlier load");
            return;
        }

        match event {
            EngineEvent::Error { message } => {
                let media_id = core.state.media().map(|m| m.id.clone());
                error!(media_id = media_id.as_deref(), %message, "Engine error");
                self.report(&PlaybackError::Engine(message), media_id);
            }
            EngineEvent::Idle => {
                self.release_resources();
                self.set_state(core, PlaybackState::Idle);
            }
            EngineEvent::Completed => {
                let Some(media) = core.state.media().cloned() else {
                    debug!("Completion without media");
                    return;
                };
                let position = self.clamped_position(core, &media);
                self.release_resources();
                self.set_state(core, PlaybackState::Completed { media, position });
            }
            EngineEvent::Buffering | EngineEvent::Playing | EngineEvent::Paused => {
                let Some(media) = core.loaded_media().cloned() else {
                    debug!(?event, "Engine event with no loaded media");
                    return;
                };
                let kind = match event {
                    EngineEvent::Buffering => StateKind::Buffering,
                    EngineEvent::Playing => StateKind::Playing,
                    _ => StateKind::Paused,
                };
                let position = self.clamped_position(core, &media);
                if let Some(next) = PlaybackState::from_parts(kind, Some(media), position) {
                    self.set_state(core, next);
                }
            }
        }
    }

    fn on_focus_change(&self, core: &mut Core, change: FocusChange) {
        let intent = self.arbiter.on_focus_change(change, core.is_rendering());
        match intent {
            Some(FocusIntent::Resume) => {
                let target = core.pending.take().or_else(|| core.loaded_media().cloned());
                let Some(target) = target else {
                    debug!("Focus regained with nothing to resume");
                    return;
                };
                info!(media_id = %target.id, "Resuming after focus gain");
                if let Err(err) = self.start(core, target) {
                    warn!(error = %err, "Failed to resume after focus gain");
                }
            }
            Some(FocusIntent::Pause) => {
                core.pending = None;
                if core.is_rendering() {
                    if let Err(err) = self.pause(core, PauseReason::FocusLoss) {
                        warn!(error = %err, "Failed to pause on focus loss");
                    }
                }
            }
            Some(FocusIntent::Duck) => {
                if let Err(err) = self.engine.set_volume(self.config.duck_volume) {
                    warn!(error = %err, "Failed to duck");
                    return;
                }
                core.ducked = true;
                debug!(volume = self.config.duck_volume, "Ducked");
            }
            Some(FocusIntent::Unduck) => self.restore_volume(core),
            None => {}
        }
    }

    fn on_becoming_noisy(&self, core: &mut Core) {
        if !core.is_rendering() {
            return;
        }
        info!("Audio becoming noisy; pausing");
        if let Err(err) = self.pause(core, PauseReason::NoisyRoute) {
            warn!(error = %err, "Failed to pause on noisy route");
        }
    }
}
