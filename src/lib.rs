//! Host-facing entry point.
//!
//! Re-exports the workspace crates so host applications depend on one crate
//! and pick platform defaults through features:
//! - `desktop-shims` (default): desktop implementations of the focus,
//!   keep-alive and route-change bridges from `bridge-desktop`.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_playback::{
    Action, Media, PlaybackConfig, PlaybackCoordinator, PlaybackError, PlaybackState,
    PlayerSession, QueueData, StateObserverHub,
};
pub use core_runtime::config::{CoreConfig, FeatureFlags};
pub use core_runtime::logging::{init_logging, LoggingConfig};
