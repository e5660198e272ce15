//! Keep-alive lock and route-change shims for desktop hosts.

use bridge_traits::{
    error::{BridgeError, Result},
    resources::{KeepAliveLock, RouteChangeListener, RouteChangeMonitor},
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Keep-alive lock that only tracks its own state.
///
/// Desktop network stacks do not power down the radio while a process is
/// streaming, so there is nothing to hold. Releasing an unheld lock fails the
/// same way the Android `WifiLock` does ("under-locked").
#[derive(Debug, Default)]
pub struct NoopKeepAliveLock {
    held: AtomicBool,
}

impl NoopKeepAliveLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeepAliveLock for NoopKeepAliveLock {
    fn acquire(&self) -> Result<()> {
        self.held.store(true, Ordering::SeqCst);
        trace!("Keep-alive lock acquired");
        Ok(())
    }

    fn release(&self) -> Result<()> {
        if !self.held.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::Released("keep-alive lock under-locked".into()));
        }
        trace!("Keep-alive lock released");
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Route monitor fed by the host.
///
/// Desktop audio stacks report device removal in host-specific ways (cpal
/// device lists, PulseAudio sink events); the host calls
/// [`DesktopRouteMonitor::notify_becoming_noisy`] when it sees one.
#[derive(Default)]
pub struct DesktopRouteMonitor {
    listener: Mutex<Option<Arc<dyn RouteChangeListener>>>,
}

impl DesktopRouteMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Returns `false` when no listener is registered.
    pub fn notify_becoming_noisy(&self) -> bool {
        let listener = self.listener.lock().clone();
        match listener {
            Some(listener) => {
                debug!("Output route becoming noisy");
                listener.on_becoming_noisy();
                true
            }
            None => false,
        }
    }
}

impl RouteChangeMonitor for DesktopRouteMonitor {
    fn register(&self, listener: Arc<dyn RouteChangeListener>) -> Result<()> {
        *self.listener.lock() = Some(listener);
        Ok(())
    }

    fn unregister(&self) -> Result<()> {
        match self.listener.lock().take() {
            Some(_) => Ok(()),
            None => Err(BridgeError::NotRegistered("route change listener".into())),
        }
    }
}
