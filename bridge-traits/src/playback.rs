//! Media engine bridge traits.
//!
//! The decode/render pipeline is owned by the host (ExoPlayer, AVPlayer,
//! a desktop audio stack). The core drives it through [`MediaEngine`] and
//! learns about its state through [`EngineListener`]. Transport calls are
//! fire-and-forget: their outcome arrives later as an [`EngineEvent`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// State change reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Nothing is prepared.
    Idle,
    /// Loading or seeking; audio will render once enough data is buffered.
    Buffering,
    /// Audio is rendering.
    Playing,
    /// Media is prepared but rendering is suspended.
    Paused,
    /// The end of the media was reached.
    Completed,
    /// Decode or network failure.
    Error { message: String },
}

impl EngineEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, EngineEvent::Error { .. })
    }
}

/// Receives engine events for one load.
pub trait EngineListener: PlatformSendSync {
    fn on_engine_event(&self, event: EngineEvent);
}

/// Opaque decode/render engine.
///
/// One instance backs one playback session. After [`stop`](Self::stop) the
/// instance has released its native resources and must not be used again.
pub trait MediaEngine: PlatformSendSync {
    /// Prepare `url` for playback. Events for this media are reported through
    /// `listener`; listeners handed to earlier loads must no longer be used.
    fn load(&self, url: &str, listener: Arc<dyn EngineListener>) -> Result<()>;

    /// Start rendering the prepared media.
    fn play(&self) -> Result<()>;

    /// Suspend rendering, keeping the media and position.
    fn pause(&self) -> Result<()>;

    /// Continue rendering after [`pause`](Self::pause).
    fn resume(&self) -> Result<()>;

    /// Release the engine.
    fn stop(&self) -> Result<()>;

    /// Seek to an absolute position.
    fn seek_to(&self, position: Duration) -> Result<()>;

    /// Output gain in `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Point-in-time playback position.
    fn position(&self) -> Duration;

    /// Duration of the prepared media, when known.
    fn duration(&self) -> Option<Duration>;

    fn is_playing(&self) -> bool;
}

/// Creates a fresh engine for each playback session.
pub trait MediaEngineFactory: PlatformSendSync {
    fn create(&self) -> Result<Box<dyn MediaEngine>>;
}
