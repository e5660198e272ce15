//! # Desktop Bridge Implementations
//!
//! Default implementations of the playback bridge traits for desktop
//! platforms (macOS, Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! Desktop operating systems have no audio focus service and no radio power
//! management, so these shims mostly track state:
//! - `AudioFocusProvider` that grants every request ([`DesktopAudioFocus`])
//! - `KeepAliveLock` that only records whether it is held ([`NoopKeepAliveLock`])
//! - `RouteChangeMonitor` fed by the host's own device notifications
//!   ([`DesktopRouteMonitor`])
//!
//! The media engine is always host-provided.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopAudioFocus, DesktopRouteMonitor, NoopKeepAliveLock};
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .engine_factory(Arc::new(MyEngineFactory))
//!     .focus_provider(Arc::new(DesktopAudioFocus::new()))
//!     .keep_alive_lock(Arc::new(NoopKeepAliveLock::new()))
//!     .route_monitor(Arc::new(DesktopRouteMonitor::new()))
//!     .build()?;
//! ```

mod focus;
mod resources;

pub use focus::DesktopAudioFocus;
pub use resources::{DesktopRouteMonitor, NoopKeepAliveLock};
