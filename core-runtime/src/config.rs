//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the platform bridges the player drives. It enforces
//! fail-fast validation so a host learns about a missing capability when it
//! builds the configuration, not when the first interruption arrives.
//!
//! ## Required Dependencies
//!
//! - `MediaEngineFactory` - Always required; the engine is host-provided
//! - `AudioFocusProvider` - System audio focus
//! - `KeepAliveLock` - Network radio keep-alive
//! - `RouteChangeMonitor` - "Audio becoming noisy" signals
//!
//! When the `desktop-shims` feature is enabled, the last three default to the
//! `bridge-desktop` shims if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(ExoPlayerFactory::new(jvm)))
//!     .focus_provider(Arc::new(AndroidAudioFocus::new(audio_manager)))
//!     .keep_alive_lock(Arc::new(AndroidWifiLock::new(wifi_manager)))
//!     .route_monitor(Arc::new(AndroidNoisyReceiver::new(context)))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No engine factory: fails with an actionable message
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media engine");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AudioFocusProvider, KeepAliveLock, MediaEngineFactory, RouteChangeMonitor};
use std::sync::Arc;

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Creates one media engine per playback session
    pub engine_factory: Arc<dyn MediaEngineFactory>,

    /// System audio focus service
    pub focus_provider: Arc<dyn AudioFocusProvider>,

    /// Network keep-alive lock held while streaming
    pub keep_alive_lock: Arc<dyn KeepAliveLock>,

    /// Source of "audio becoming noisy" signals
    pub route_monitor: Arc<dyn RouteChangeMonitor>,

    /// Features flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("engine_factory", &"MediaEngineFactory { ... }")
            .field("focus_provider", &"AudioFocusProvider { ... }")
            .field("keep_alive_lock", &"KeepAliveLock { ... }")
            .field("route_monitor", &"RouteChangeMonitor { ... }")
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control which platform resources the player touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Hold the keep-alive lock while rendering. Hosts that only play local
    /// files can turn this off.
    pub hold_keep_alive_lock: bool,

    /// Pause when the output route becomes noisy (headphones unplugged).
    pub pause_on_noisy_route: bool,

    /// Request audio focus before playing. Turning this off makes the player
    /// ignore other applications entirely.
    pub request_audio_focus: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            hold_keep_alive_lock: true,
            pause_on_noisy_route: true,
            request_audio_focus: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates flag combinations.
    pub fn validate(&self) -> Result<()> {
        if !self.features.request_audio_focus && self.features.pause_on_noisy_route {
            // Without focus there is no resume path after a noisy pause other
            // than an explicit user command, which is still valid.
            tracing::debug!("Noisy-route pause enabled without audio focus");
        }
        Ok(())
    }
}

fn engine_factory_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaEngineFactory".to_string(),
        message: "A media engine is required to render audio. \
                 Android: wrap ExoPlayer/Media3. \
                 iOS: wrap AVPlayer. \
                 Desktop: wrap the host's audio stack."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn focus_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioFocusProvider".to_string(),
        message: "AudioFocusProvider implementation is required to coexist with other audio apps. \
                 Desktop: enable the 'desktop-shims' feature to use DesktopAudioFocus. \
                 Android: wrap AudioManager.requestAudioFocus. \
                 iOS: wrap AVAudioSession interruption handling."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn keep_alive_lock_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeepAliveLock".to_string(),
        message: "KeepAliveLock implementation is required while streaming. \
                 Desktop: enable the 'desktop-shims' feature to use NoopKeepAliveLock. \
                 Android: wrap WifiManager.WifiLock. \
                 Or disable the 'hold_keep_alive_lock' feature flag."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn route_monitor_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "RouteChangeMonitor".to_string(),
        message: "RouteChangeMonitor implementation is required to pause on headphone unplug. \
                 Desktop: enable the 'desktop-shims' feature to use DesktopRouteMonitor. \
                 Android: register for ACTION_AUDIO_BECOMING_NOISY. \
                 iOS: observe AVAudioSession.routeChangeNotification."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_focus_provider() -> Result<Arc<dyn AudioFocusProvider>> {
    Ok(Arc::new(bridge_desktop::DesktopAudioFocus::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_focus_provider() -> Result<Arc<dyn AudioFocusProvider>> {
    Err(focus_provider_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_keep_alive_lock() -> Result<Arc<dyn KeepAliveLock>> {
    Ok(Arc::new(bridge_desktop::NoopKeepAliveLock::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_keep_alive_lock() -> Result<Arc<dyn KeepAliveLock>> {
    Err(keep_alive_lock_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_route_monitor() -> Result<Arc<dyn RouteChangeMonitor>> {
    Ok(Arc::new(bridge_desktop::DesktopRouteMonitor::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_route_monitor() -> Result<Arc<dyn RouteChangeMonitor>> {
    Err(route_monitor_missing_error())
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    engine_factory: Option<Arc<dyn MediaEngineFactory>>,
    focus_provider: Option<Arc<dyn AudioFocusProvider>>,
    keep_alive_lock: Option<Arc<dyn KeepAliveLock>>,
    route_monitor: Option<Arc<dyn RouteChangeMonitor>>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    pub fn engine_factory(mut self, factory: Arc<dyn MediaEngineFactory>) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    pub fn focus_provider(mut self, provider: Arc<dyn AudioFocusProvider>) -> Self {
        self.focus_provider = Some(provider);
        self
    }

    pub fn keep_alive_lock(mut self, lock: Arc<dyn KeepAliveLock>) -> Self {
        self.keep_alive_lock = Some(lock);
        self
    }

    pub fn route_monitor(mut self, monitor: Arc<dyn RouteChangeMonitor>) -> Self {
        self.route_monitor = Some(monitor);
        self
    }

    /// Default: true
    pub fn hold_keep_alive_lock(mut self, enabled: bool) -> Self {
        self.features.hold_keep_alive_lock = enabled;
        self
    }

    /// Default: true
    pub fn pause_on_noisy_route(mut self, enabled: bool) -> Self {
        self.features.pause_on_noisy_route = enabled;
        self
    }

    /// Default: true
    pub fn request_audio_focus(mut self, enabled: bool) -> Self {
        self.features.request_audio_focus = enabled;
        self
    }

    /// Sets all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when the engine factory is absent,
    /// or when another bridge is absent and the `desktop-shims` feature is
    /// disabled.
    pub fn build(self) -> Result<CoreConfig> {
        let engine_factory = self.engine_factory.ok_or_else(engine_factory_missing_error)?;

        let focus_provider = match self.focus_provider {
            Some(provider) => provider,
            None => provide_default_focus_provider()?,
        };

        let keep_alive_lock = match self.keep_alive_lock {
            Some(lock) => lock,
            None => provide_default_keep_alive_lock()?,
        };

        let route_monitor = match self.route_monitor {
            Some(monitor) => monitor,
            None => provide_default_route_monitor()?,
        };

        let config = CoreConfig {
            engine_factory,
            focus_provider,
            keep_alive_lock,
            route_monitor,
            features: self.features,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        EngineListener, FocusChangeListener, FocusRequest, FocusRequestResult, MediaEngine,
        RouteChangeListener,
    };
    use std::time::Duration;

    struct MockEngine;

    impl MediaEngine for MockEngine {
        fn load(&self, _url: &str, _listener: Arc<dyn EngineListener>) -> BridgeResult<()> {
            Ok(())
        }
        fn play(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn resume(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn stop(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn seek_to(&self, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
            Ok(())
        }
        fn position(&self) -> Duration {
            Duration::ZERO
        }
        fn duration(&self) -> Option<Duration> {
            None
        }
        fn is_playing(&self) -> bool {
            false
        }
    }

    struct MockEngineFactory;

    impl MediaEngineFactory for MockEngineFactory {
        fn create(&self) -> BridgeResult<Box<dyn MediaEngine>> {
            Ok(Box::new(MockEngine))
        }
    }

    struct MockFocus;

    impl AudioFocusProvider for MockFocus {
        fn request(
            &self,
            _request: &FocusRequest,
            _listener: Arc<dyn FocusChangeListener>,
        ) -> BridgeResult<FocusRequestResult> {
            Ok(FocusRequestResult::Granted)
        }
        fn abandon(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct MockLock;

    impl KeepAliveLock for MockLock {
        fn acquire(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn release(&self) -> BridgeResult<()> {
            Ok(())
        }
        fn is_held(&self) -> bool {
            false
        }
    }

    struct MockRoute;

    impl RouteChangeMonitor for MockRoute {
        fn register(&self, _listener: Arc<dyn RouteChangeListener>) -> BridgeResult<()> {
            Ok(())
        }
        fn unregister(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .engine_factory(Arc::new(MockEngineFactory))
            .focus_provider(Arc::new(MockFocus))
            .keep_alive_lock(Arc::new(MockLock))
            .route_monitor(Arc::new(MockRoute))
    }

    #[test]
    fn test_build_with_all_bridges() {
        let config = full_builder().build().expect("all bridges provided");
        assert_eq!(config.features, FeatureFlags::default());
        assert!(config.engine_factory.create().is_ok());
    }

    #[test]
    fn test_missing_engine_factory_fails_fast() {
        let err = CoreConfig::builder()
            .focus_provider(Arc::new(MockFocus))
            .keep_alive_lock(Arc::new(MockLock))
            .route_monitor(Arc::new(MockRoute))
            .build()
            .unwrap_err();

        match err {
            Error::CapabilityMissing { capability, message } => {
                assert_eq!(capability, "MediaEngineFactory");
                assert!(message.contains("ExoPlayer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_focus_provider_without_shims() {
        let err = CoreConfig::builder()
            .engine_factory(Arc::new(MockEngineFactory))
            .keep_alive_lock(Arc::new(MockLock))
            .route_monitor(Arc::new(MockRoute))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            Error::CapabilityMissing { ref capability, .. } if capability == "AudioFocusProvider"
        ));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_shims_fill_missing_bridges() {
        let config = CoreConfig::builder()
            .engine_factory(Arc::new(MockEngineFactory))
            .build()
            .expect("desktop shims should fill in the rest");

        assert!(!config.keep_alive_lock.is_held());
    }

    #[test]
    fn test_feature_flag_builders() {
        let config = full_builder()
            .hold_keep_alive_lock(false)
            .pause_on_noisy_route(false)
            .request_audio_focus(false)
            .build()
            .unwrap();

        assert!(!config.features.hold_keep_alive_lock);
        assert!(!config.features.pause_on_noisy_route);
        assert!(!config.features.request_audio_focus);
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = full_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("MediaEngineFactory { ... }"));
        assert!(debug.contains("hold_keep_alive_lock"));
    }
}
