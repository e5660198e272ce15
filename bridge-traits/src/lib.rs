//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform. Each trait represents a capability the core drives but that is
//! implemented differently per platform (Android, iOS, desktop).
//!
//! ## Traits
//!
//! ### Audio Output
//! - [`MediaEngine`](playback::MediaEngine) - Decode/render engine with transport controls
//! - [`MediaEngineFactory`](playback::MediaEngineFactory) - One engine per playback session
//! - [`AudioFocusProvider`](focus::AudioFocusProvider) - System audio focus arbitration
//!
//! ### Platform Resources
//! - [`KeepAliveLock`](resources::KeepAliveLock) - Network radio keep-alive (wifi lock)
//! - [`RouteChangeMonitor`](resources::RouteChangeMonitor) - "Audio becoming noisy" signals
//!
//! ### Utilities
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Shims (no system focus) |
//! | Android  | host app            | 📋 Host-provided |
//! | iOS      | host app            | 📋 Host-provided |
//!
//! ## Callbacks
//!
//! Listener traits ([`FocusChangeListener`](focus::FocusChangeListener),
//! [`EngineListener`](playback::EngineListener),
//! [`RouteChangeListener`](resources::RouteChangeListener)) are implemented by
//! the core and invoked by the host, possibly on threads the core does not
//! own and possibly from inside a call the core is making. Implementations on
//! the core side never block.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native exceptions into it and keep the
//! message actionable.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::resources::KeepAliveLock;
//! use bridge_traits::error::Result;
//!
//! struct AndroidWifiLock { /* jni handle */ }
//!
//! impl KeepAliveLock for AndroidWifiLock {
//!     fn acquire(&self) -> Result<()> { /* WifiLock.acquire() */ Ok(()) }
//!     fn release(&self) -> Result<()> { /* WifiLock.release() */ Ok(()) }
//!     fn is_held(&self) -> bool { /* WifiLock.isHeld */ false }
//! }
//! ```

pub mod error;
pub mod focus;
pub mod logger;
pub mod platform;
pub mod playback;
pub mod resources;

pub use error::BridgeError;

// Re-export commonly used types
pub use focus::{
    AudioFocusProvider, AudioUsage, ContentType, FocusChange, FocusChangeListener, FocusRequest,
    FocusRequestResult,
};
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{EngineEvent, EngineListener, MediaEngine, MediaEngineFactory};
pub use resources::{KeepAliveLock, RouteChangeListener, RouteChangeMonitor};
