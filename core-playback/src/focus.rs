//! # Audio Focus Arbiter
//!
//! Requests and abandons system audio focus and turns platform focus
//! callbacks into playback intents.
//!
//! ## Overview
//!
//! The arbiter owns a small [`FocusState`] guarded by a mutex. Platform
//! callbacks and user commands both go through that lock, so a `Gain`
//! racing with `release_focus` never observes a half-updated state.
//!
//! | Change                 | Condition         | Intent   |
//! |------------------------|-------------------|----------|
//! | `Gain`                 | delayed grant     | `Resume` |
//! | `Gain`                 | resume pending    | `Resume` |
//! | `Gain`                 | ducked            | `Unduck` |
//! | `TransientLoss`        | playing           | `Pause`  |
//! | `TransientLossCanDuck` | playing           | `Duck`   |
//! | `Loss`                 | always            | `Pause`  |

use bridge_traits::{
    AudioFocusProvider, FocusChange, FocusChangeListener, FocusRequest, FocusRequestResult,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Answer to [`AudioFocusArbiter::request_focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Granted,
    Denied,
    /// Focus arrives later through a `Gain` callback.
    Delayed,
}

/// What the coordinator should do after a focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusIntent {
    Resume,
    Pause,
    Duck,
    Unduck,
}

/// Arbiter sub-state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    pub held: bool,
    /// A delayed grant is outstanding.
    pub delayed: bool,
    /// Playback was paused by a transient loss and resumes on `Gain`.
    pub resume_on_gain: bool,
    /// Output volume is lowered for another app.
    pub ducked: bool,
}

pub struct AudioFocusArbiter {
    provider: Arc<dyn AudioFocusProvider>,
    request: FocusRequest,
    enabled: bool,
    state: Mutex<FocusState>,
}

impl AudioFocusArbiter {
    pub fn new(provider: Arc<dyn AudioFocusProvider>, request: FocusRequest) -> Self {
        Self {
            provider,
            request,
            enabled: true,
            state: Mutex::new(FocusState::default()),
        }
    }

    /// Arbiter that never talks to the platform and always grants.
    pub fn disabled(provider: Arc<dyn AudioFocusProvider>, request: FocusRequest) -> Self {
        Self {
            enabled: false,
            ..Self::new(provider, request)
        }
    }

    pub fn state(&self) -> FocusState {
        *self.state.lock()
    }

    pub fn is_held(&self) -> bool {
        self.state.lock().held
    }

    /// Ask the platform for focus.
    ///
    /// `listener` receives later focus changes. A focus already held is not
    /// requested again.
    pub fn request_focus(&self, listener: Arc<dyn FocusChangeListener>) -> Result<FocusOutcome> {
        if !self.enabled {
            return Ok(FocusOutcome::Granted);
        }

        if self.state.lock().held {
            return Ok(FocusOutcome::Granted);
        }

        // The provider may call back synchronously; never hold the lock across it.
        let result = self.provider.request(&self.request, listener)?;

        let mut state = self.state.lock();
        let outcome = match result {
            FocusRequestResult::Granted => {
                state.held = true;
                state.delayed = false;
                FocusOutcome::Granted
            }
            FocusRequestResult::Delayed => {
                state.held = false;
                state.delayed = true;
                FocusOutcome::Delayed
            }
            FocusRequestResult::Denied => {
                state.held = false;
                state.delayed = false;
                FocusOutcome::Denied
            }
        };
        info!(?outcome, "Audio focus requested");
        Ok(outcome)
    }

    /// Abandon focus and clear all sub-state. Idempotent.
    pub fn release_focus(&self) -> Result<()> {
        let previous = std::mem::take(&mut *self.state.lock());
        if !self.enabled || !(previous.held || previous.delayed) {
            return Ok(());
        }

        debug!("Abandoning audio focus");
        if let Err(err) = self.provider.abandon() {
            if err.is_benign() {
                debug!(error = %err, "Focus already abandoned");
            } else {
                warn!(error = %err, "Failed to abandon audio focus");
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Forget any pending automatic resume. Used when the user takes over.
    pub fn cancel_pending_resume(&self) {
        let mut state = self.state.lock();
        state.resume_on_gain = false;
        state.delayed = false;
    }

    /// Update the sub-state for `change` and return what playback should do.
    ///
    /// `playing` reports whether audio is currently rendering (or about to).
    pub fn on_focus_change(&self, change: FocusChange, playing: bool) -> Option<FocusIntent> {
        let mut state = self.state.lock();
        let intent = match change {
            FocusChange::Gain => {
                state.held = true;
                if state.delayed {
                    state.delayed = false;
                    state.ducked = false;
                    Some(FocusIntent::Resume)
                } else if state.resume_on_gain {
                    state.resume_on_gain = false;
                    state.ducked = false;
                    Some(FocusIntent::Resume)
                } else if state.ducked {
                    state.ducked = false;
                    Some(FocusIntent::Unduck)
                } else {
                    None
                }
            }
            FocusChange::TransientLoss => {
                state.held = false;
                if playing {
                    state.resume_on_gain = true;
                    Some(FocusIntent::Pause)
                } else {
                    None
                }
            }
            FocusChange::TransientLossCanDuck => {
                if playing {
                    state.ducked = true;
                    Some(FocusIntent::Duck)
                } else {
                    None
                }
            }
            FocusChange::Loss => {
                *state = FocusState::default();
                Some(FocusIntent::Pause)
            }
        };
        debug!(?change, playing, ?intent, state = ?*state, "Focus change");
        intent
    }
}

impl std::fmt::Debug for AudioFocusArbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFocusArbiter")
            .field("request", &self.request)
            .field("enabled", &self.enabled)
            .field("state", &*self.state.lock())
            .finish()
    }
}
