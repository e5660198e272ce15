//! Audio focus shim for desktop hosts.

use bridge_traits::{
    error::Result,
    focus::{AudioFocusProvider, FocusChange, FocusChangeListener, FocusRequest, FocusRequestResult},
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Desktop focus provider.
///
/// Desktop operating systems do not arbitrate audio output between
/// applications, so every request is granted immediately. Hosts that do get
/// interruption signals (a VoIP client, a screen locker) can forward them
/// with [`DesktopAudioFocus::deliver`].
#[derive(Default)]
pub struct DesktopAudioFocus {
    listener: Mutex<Option<Arc<dyn FocusChangeListener>>>,
}

impl DesktopAudioFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request is outstanding.
    pub fn is_requested(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Forward a focus change to the current listener. Returns `false` when
    /// nobody holds focus.
    pub fn deliver(&self, change: FocusChange) -> bool {
        // Clone out so the listener runs without our lock held.
        let listener = self.listener.lock().clone();
        match listener {
            Some(listener) => {
                debug!(?change, "Delivering desktop focus change");
                listener.on_focus_change(change);
                true
            }
            None => false,
        }
    }
}

impl AudioFocusProvider for DesktopAudioFocus {
    fn request(
        &self,
        request: &FocusRequest,
        listener: Arc<dyn FocusChangeListener>,
    ) -> Result<FocusRequestResult> {
        debug!(usage = ?request.usage, content = ?request.content_type, "Granting desktop focus");
        *self.listener.lock() = Some(listener);
        Ok(FocusRequestResult::Granted)
    }

    fn abandon(&self) -> Result<()> {
        self.listener.lock().take();
        Ok(())
    }
}
