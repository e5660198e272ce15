//! # Resource Guard
//!
//! Holds the platform resources playback needs while audio renders: the
//! network keep-alive lock and the "audio becoming noisy" registration.
//!
//! Both are tracked with booleans owned by the guard so acquire and release
//! are idempotent whatever the platform does with repeated calls.

use bridge_traits::{KeepAliveLock, RouteChangeListener, RouteChangeMonitor};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardState {
    pub lock_held: bool,
    pub route_registered: bool,
}

pub struct ResourceGuard {
    lock: Arc<dyn KeepAliveLock>,
    monitor: Arc<dyn RouteChangeMonitor>,
    hold_lock: bool,
    watch_route: bool,
    state: Mutex<GuardState>,
}

impl ResourceGuard {
    pub fn new(lock: Arc<dyn KeepAliveLock>, monitor: Arc<dyn RouteChangeMonitor>) -> Self {
        Self {
            lock,
            monitor,
            hold_lock: true,
            watch_route: true,
            state: Mutex::new(GuardState::default()),
        }
    }

    /// Skip the keep-alive lock (local playback only).
    pub fn with_keep_alive(mut self, enabled: bool) -> Self {
        self.hold_lock = enabled;
        self
    }

    /// Skip noisy-route registration.
    pub fn with_route_watch(mut self, enabled: bool) -> Self {
        self.watch_route = enabled;
        self
    }

    pub fn state(&self) -> GuardState {
        *self.state.lock()
    }

    /// Acquire the lock and register `listener`. Held resources are left alone.
    pub fn acquire(&self, listener: &Arc<dyn RouteChangeListener>) -> Result<()> {
        let mut state = self.state.lock();

        if self.hold_lock && !state.lock_held {
            if !self.lock.is_held() {
                self.lock.acquire()?;
            }
            state.lock_held = true;
            debug!("Keep-alive lock acquired");
        }

        if self.watch_route && !state.route_registered {
            self.monitor.register(Arc::clone(listener))?;
            state.route_registered = true;
            debug!("Route change listener registered");
        }

        Ok(())
    }

    /// Release everything held. Releasing nothing is a no-op.
    ///
    /// Both resources are always attempted; the first non-benign platform
    /// error is returned after the guard has forgotten them.
    pub fn release(&self) -> Result<()> {
        let mut state = self.state.lock();
        let mut first_error: Option<PlaybackError> = None;

        if state.lock_held {
            state.lock_held = false;
            match self.lock.release() {
                Ok(()) => debug!("Keep-alive lock released"),
                Err(err) if err.is_benign() => debug!(error = %err, "Keep-alive lock already released"),
                Err(err) => {
                    warn!(error = %err, "Failed to release keep-alive lock");
                    first_error.get_or_insert(err.into());
                }
            }
        }

        if state.route_registered {
            state.route_registered = false;
            match self.monitor.unregister() {
                Ok(()) => debug!("Route change listener unregistered"),
                Err(err) if err.is_benign() => {
                    debug!(error = %err, "Route change listener was not registered")
                }
                Err(err) => {
                    warn!(error = %err, "Failed to unregister route change listener");
                    first_error.get_or_insert(err.into());
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("hold_lock", &self.hold_lock)
            .field("watch_route", &self.watch_route)
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::BridgeError;
    use mockall::mock;

    mock! {
        Lock {}

        impl KeepAliveLock for Lock {
            fn acquire(&self) -> BridgeResult<()>;
            fn release(&self) -> BridgeResult<()>;
            fn is_held(&self) -> bool;
        }
    }

    mock! {
        Monitor {}

        impl RouteChangeMonitor for Monitor {
            fn register(&self, listener: Arc<dyn RouteChangeListener>) -> BridgeResult<()>;
            fn unregister(&self) -> BridgeResult<()>;
        }
    }

    struct Ignore;

    impl RouteChangeListener for Ignore {
        fn on_becoming_noisy(&self) {}
    }

    fn listener() -> Arc<dyn RouteChangeListener> {
        Arc::new(Ignore)
    }

    #[test]
    fn test_double_acquire_holds_once() {
        let mut lock = MockLock::new();
        lock.expect_is_held().times(1).return_const(false);
        lock.expect_acquire().times(1).returning(|| Ok(()));

        let mut monitor = MockMonitor::new();
        monitor.expect_register().times(1).returning(|_| Ok(()));

        let guard = ResourceGuard::new(Arc::new(lock), Arc::new(monitor));
        let listener = listener();
        guard.acquire(&listener).unwrap();
        guard.acquire(&listener).unwrap();

        assert_eq!(
            guard.state(),
            GuardState {
                lock_held: true,
                route_registered: true
            }
        );
    }

    #[test]
    fn test_double_release_is_silent() {
        let mut lock = MockLock::new();
        lock.expect_is_held().return_const(false);
        lock.expect_acquire().returning(|| Ok(()));
        lock.expect_release().times(1).returning(|| Ok(()));

        let mut monitor = MockMonitor::new();
        monitor.expect_register().returning(|_| Ok(()));
        monitor.expect_unregister().times(1).returning(|| Ok(()));

        let guard = ResourceGuard::new(Arc::new(lock), Arc::new(monitor));
        guard.acquire(&listener()).unwrap();
        guard.release().unwrap();
        guard.release().unwrap();
        assert_eq!(guard.state(), GuardState::default());
    }

    #[test]
    fn test_release_without_acquire_touches_nothing() {
        let lock = MockLock::new();
        let monitor = MockMonitor::new();
        let guard = ResourceGuard::new(Arc::new(lock), Arc::new(monitor));
        guard.release().unwrap();
    }

    #[test]
    fn test_lock_already_held_by_platform_is_not_reacquired() {
        let mut lock = MockLock::new();
        lock.expect_is_held().return_const(true);
        lock.expect_acquire().never();

        let guard = ResourceGuard::new(Arc::new(lock), Arc::new(MockMonitor::new()))
            .with_route_watch(false);
        guard.acquire(&listener()).unwrap();
        assert!(guard.state().lock_held);
    }

    #[test]
    fn test_unregister_failure_is_tolerated() {
        let mut monitor = MockMonitor::new();
        monitor.expect_register().returning(|_| Ok(()));
        monitor
            .expect_unregister()
            .returning(|| Err(BridgeError::NotRegistered("receiver".into())));

        let guard = ResourceGuard::new(Arc::new(MockLock::new()), Arc::new(monitor))
            .with_keep_alive(false);
        guard.acquire(&listener()).unwrap();
        guard.release().unwrap();
        assert!(!guard.state().route_registered);
    }

    #[test]
    fn test_hard_release_failure_still_releases_route() {
        let mut lock = MockLock::new();
        lock.expect_is_held().return_const(false);
        lock.expect_acquire().returning(|| Ok(()));
        lock.expect_release()
            .returning(|| Err(BridgeError::OperationFailed("binder died".into())));

        let mut monitor = MockMonitor::new();
        monitor.expect_register().returning(|_| Ok(()));
        monitor.expect_unregister().times(1).returning(|| Ok(()));

        let guard = ResourceGuard::new(Arc::new(lock), Arc::new(monitor));
        guard.acquire(&listener()).unwrap();

        let err = guard.release().unwrap_err();
        assert!(matches!(err, PlaybackError::Bridge(_)));
        assert_eq!(guard.state(), GuardState::default());
    }
}
