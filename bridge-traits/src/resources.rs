//! Platform Resource Abstractions
//!
//! Resources the player must hold while audio is rendering:
//!
//! - [`KeepAliveLock`]: keeps the network radio awake while streaming
//!   (Android `WifiLock`, iOS background audio assertion).
//! - [`RouteChangeMonitor`]: reports that the audio output route is about to
//!   become audible unintentionally, e.g. headphones unplugged
//!   (Android `ACTION_AUDIO_BECOMING_NOISY`, iOS `routeChangeNotification`).

use std::sync::Arc;

use crate::{error::Result, platform::PlatformSendSync};

/// Network keep-alive lock.
///
/// Implementations are not required to be reference counted; the core never
/// acquires a lock it already holds.
pub trait KeepAliveLock: PlatformSendSync {
    fn acquire(&self) -> Result<()>;

    fn release(&self) -> Result<()>;

    fn is_held(&self) -> bool;
}

/// Receives "audio becoming noisy" signals.
pub trait RouteChangeListener: PlatformSendSync {
    fn on_becoming_noisy(&self);
}

/// Registration point for route-change signals.
pub trait RouteChangeMonitor: PlatformSendSync {
    /// Start delivering signals to `listener`, replacing any previous one.
    fn register(&self, listener: Arc<dyn RouteChangeListener>) -> Result<()>;

    /// Stop delivering signals. Unregistering when nothing is registered is
    /// allowed to fail with [`BridgeError::NotRegistered`](crate::BridgeError::NotRegistered);
    /// callers treat that as a no-op.
    fn unregister(&self) -> Result<()>;
}
