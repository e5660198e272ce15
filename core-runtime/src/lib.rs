//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback crates:
//! - Logging and tracing setup
//! - Configuration of the host bridges
//! - Typed event and state channels
//!
//! ## Overview
//!
//! Nothing in here knows about playback semantics. `core-playback` builds its
//! coordinator on these pieces and the host configures them once at startup.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, FeatureFlags};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream, StateChannel};
