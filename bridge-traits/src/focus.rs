//! Audio Focus Abstraction
//!
//! Exposes the platform's audio focus arbitration service to the core. Only
//! one application at a time holds full focus; the platform notifies the
//! holder asynchronously when another application takes it away.
//!
//! # Platform Support
//!
//! - **Android**: `AudioManager.requestAudioFocus` / `AudioFocusRequest`
//! - **iOS**: `AVAudioSession` interruption notifications
//! - **Desktop**: no system arbitration; see `bridge-desktop`
//!
//! # Threading
//!
//! [`FocusChangeListener::on_focus_change`] is invoked on a platform-owned
//! thread and may race with calls to [`AudioFocusProvider::request`] and
//! [`AudioFocusProvider::abandon`] made from user-initiated commands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// What the audio stream is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioUsage {
    Media,
    Game,
    Assistant,
}

/// Kind of content carried by the audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Music,
    Speech,
    Movie,
    Unknown,
}

/// Parameters of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRequest {
    pub usage: AudioUsage,
    pub content_type: ContentType,
    /// Whether the platform may answer [`FocusRequestResult::Delayed`] and
    /// grant focus later through [`FocusChange::Gain`].
    pub accept_delayed: bool,
}

impl Default for FocusRequest {
    fn default() -> Self {
        Self {
            usage: AudioUsage::Media,
            content_type: ContentType::Music,
            accept_delayed: false,
        }
    }
}

impl FocusRequest {
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_accept_delayed(mut self, accept_delayed: bool) -> Self {
        self.accept_delayed = accept_delayed;
        self
    }
}

/// Immediate answer to a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusRequestResult {
    /// Focus is held from now on.
    Granted,
    /// Another client holds exclusive focus (e.g. an ongoing call).
    Denied,
    /// Focus will be granted later through [`FocusChange::Gain`].
    Delayed,
}

/// Asynchronous focus change reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusChange {
    /// Focus (re)gained, including a deferred grant.
    Gain,
    /// Focus lost for a short time (incoming call, navigation prompt).
    TransientLoss,
    /// Focus lost for a short time but output may continue at low volume.
    TransientLossCanDuck,
    /// Focus lost for an unbounded time (another player started).
    Loss,
}

/// Receives focus changes from the platform.
pub trait FocusChangeListener: PlatformSendSync {
    fn on_focus_change(&self, change: FocusChange);
}

/// Platform audio focus service.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::focus::{AudioFocusProvider, FocusRequest, FocusRequestResult};
///
/// fn try_start(provider: &dyn AudioFocusProvider, listener: Arc<dyn FocusChangeListener>) -> bool {
///     matches!(
///         provider.request(&FocusRequest::default(), listener),
///         Ok(FocusRequestResult::Granted)
///     )
/// }
/// ```
pub trait AudioFocusProvider: PlatformSendSync {
    /// Ask the platform for focus. The listener receives every later change
    /// until [`abandon`](Self::abandon) is called.
    fn request(
        &self,
        request: &FocusRequest,
        listener: Arc<dyn FocusChangeListener>,
    ) -> Result<FocusRequestResult>;

    /// Give focus back and detach the listener. Abandoning when no request is
    /// outstanding must succeed.
    fn abandon(&self) -> Result<()>;
}
