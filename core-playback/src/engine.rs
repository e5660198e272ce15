//! # Media Engine Adapter
//!
//! Wraps the host's [`MediaEngine`] for one playback session.
//!
//! ## Overview
//!
//! Every load gets a new generation number and a listener stamped with it.
//! Events therefore arrive at the [`EngineEventSink`] together with the
//! generation of the load that produced them, and
//! [`MediaEngineAdapter::is_current`] tells late events from an earlier
//! media apart from live ones.
//!
//! Releasing the adapter is terminal: the engine is stopped once and every
//! later transport call fails with [`PlaybackError::EngineReleased`].

use bridge_traits::{EngineEvent, EngineListener, MediaEngine};
use core_runtime::logging::redact_url;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{PlaybackError, Result};
use crate::state::Media;

/// Receives engine events tagged with the generation of their load.
pub trait EngineEventSink: Send + Sync {
    fn on_engine_event(&self, generation: u64, event: EngineEvent);
}

/// Listener handed to the engine for a single load.
struct GenerationListener {
    generation: u64,
    sink: Weak<dyn EngineEventSink>,
}

impl EngineListener for GenerationListener {
    fn on_engine_event(&self, event: EngineEvent) {
        match self.sink.upgrade() {
            Some(sink) => sink.on_engine_event(self.generation, event),
            None => debug!(generation = self.generation, ?event, "Engine event after coordinator dropped"),
        }
    }
}

pub struct MediaEngineAdapter {
    engine: Box<dyn MediaEngine>,
    generation: AtomicU64,
    released: AtomicBool,
}

impl MediaEngineAdapter {
    pub fn new(engine: Box<dyn MediaEngine>) -> Self {
        Self {
            engine,
            generation: AtomicU64::new(0),
            released: AtomicBool::new(false),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released.load(Ordering::SeqCst) {
            Err(PlaybackError::EngineReleased)
        } else {
            Ok(())
        }
    }

    /// Generation of the most recent load. Zero before the first load.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether an event stamped with `generation` belongs to the live load.
    pub fn is_current(&self, generation: u64) -> bool {
        !self.is_released() && generation == self.generation()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Load `media` and start rendering it. Returns the new generation.
    ///
    /// The generation is bumped before the engine sees the URL, so events
    /// the engine reports synchronously from inside `load` already carry it.
    #[instrument(skip(self, media, sink), fields(media_id = %media.id))]
    pub fn load_and_play(&self, media: &Media, sink: Weak<dyn EngineEventSink>) -> Result<u64> {
        self.ensure_live()?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let listener: Arc<dyn EngineListener> = Arc::new(GenerationListener { generation, sink });

        self.engine.load(&media.stream_url, listener)?;
        self.engine.play()?;
        info!(generation, url = %redact_url(&media.stream_url), "Media loaded");
        Ok(generation)
    }

    pub fn pause(&self) -> Result<()> {
        self.ensure_live()?;
        self.engine.pause()?;
        Ok(())
    }

    pub fn resume(&self) -> Result<()> {
        self.ensure_live()?;
        self.engine.resume()?;
        Ok(())
    }

    pub fn seek_to(&self, position: Duration) -> Result<()> {
        self.ensure_live()?;
        self.engine.seek_to(position)?;
        Ok(())
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.ensure_live()?;
        self.engine.set_volume(volume.clamp(0.0, 1.0))?;
        Ok(())
    }

    /// Current engine position; zero once released.
    pub fn position(&self) -> Duration {
        if self.is_released() {
            return Duration::ZERO;
        }
        self.engine.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        if self.is_released() {
            return None;
        }
        self.engine.duration()
    }

    pub fn is_playing(&self) -> bool {
        !self.is_released() && self.engine.is_playing()
    }

    /// Stop the engine and release it. Later calls are no-ops.
    pub fn release(&self) -> Result<()> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Orphan listeners of the last load.
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!("Releasing media engine");
        self.engine.stop()?;
        Ok(())
    }
}

impl std::fmt::Debug for MediaEngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaEngineAdapter")
            .field("generation", &self.generation())
            .field("released", &self.is_released())
            .finish()
    }
}
