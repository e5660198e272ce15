//! Thread-safe fakes of the host bridges shared by the integration tests.

#![allow(dead_code)]

use bridge_desktop::{DesktopRouteMonitor, NoopKeepAliveLock};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AudioFocusProvider, EngineEvent, EngineListener, FocusChange, FocusChangeListener,
    FocusRequest, FocusRequestResult, MediaEngine, MediaEngineFactory,
};
use core_playback::{Media, PlaybackConfig, PlaybackCoordinator};
use core_runtime::config::CoreConfig;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Engine
// ============================================================================

#[derive(Clone, Default)]
pub struct FakeEngine {
    pub calls: Arc<Mutex<Vec<String>>>,
    listeners: Arc<Mutex<Vec<Arc<dyn EngineListener>>>>,
    position: Arc<Mutex<Duration>>,
    volume: Arc<Mutex<f32>>,
    /// Events reported from inside `load`, before it returns.
    on_load: Arc<Mutex<Vec<EngineEvent>>>,
    /// URLs containing any of these fragments fail to load.
    broken: Arc<Mutex<Vec<String>>>,
}

impl FakeEngine {
    pub fn emit(&self, event: EngineEvent) {
        let listener = self.listeners.lock().last().cloned();
        if let Some(listener) = listener {
            listener.on_engine_event(event);
        }
    }

    /// Listener handed to the `n`th load (zero based).
    pub fn listener(&self, n: usize) -> Arc<dyn EngineListener> {
        self.listeners.lock()[n].clone()
    }

    pub fn report_on_load(&self, events: Vec<EngineEvent>) {
        *self.on_load.lock() = events;
    }

    pub fn break_urls_containing(&self, fragment: &str) {
        self.broken.lock().push(fragment.to_string());
    }

    pub fn set_position(&self, position: Duration) {
        *self.position.lock() = position;
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl MediaEngine for FakeEngine {
    fn load(&self, url: &str, listener: Arc<dyn EngineListener>) -> BridgeResult<()> {
        self.record(format!("load {url}"));
        if self.broken.lock().iter().any(|f| url.contains(f.as_str())) {
            return Err(BridgeError::OperationFailed("bad url".to_string()));
        }
        *self.position.lock() = Duration::ZERO;
        self.listeners.lock().push(listener.clone());

        let events = self.on_load.lock().clone();
        for event in events {
            listener.on_engine_event(event);
        }
        Ok(())
    }

    fn play(&self) -> BridgeResult<()> {
        self.record("play");
        Ok(())
    }

    fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        Ok(())
    }

    fn resume(&self) -> BridgeResult<()> {
        self.record("resume");
        Ok(())
    }

    fn stop(&self) -> BridgeResult<()> {
        self.record("stop");
        Ok(())
    }

    fn seek_to(&self, position: Duration) -> BridgeResult<()> {
        self.record(format!("seek {}", position.as_millis()));
        *self.position.lock() = position;
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        *self.volume.lock() = volume;
        Ok(())
    }

    fn position(&self) -> Duration {
        *self.position.lock()
    }

    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(240))
    }

    fn is_playing(&self) -> bool {
        false
    }
}

pub struct FakeEngineFactory(pub FakeEngine);

impl MediaEngineFactory for FakeEngineFactory {
    fn create(&self) -> BridgeResult<Box<dyn MediaEngine>> {
        Ok(Box::new(self.0.clone()))
    }
}

// ============================================================================
// Audio focus
// ============================================================================

/// Focus provider answering every request with a scripted result.
pub struct ScriptedFocus {
    answer: Mutex<FocusRequestResult>,
    listener: Mutex<Option<Arc<dyn FocusChangeListener>>>,
    pub requests: AtomicUsize,
    pub abandons: AtomicUsize,
}

impl ScriptedFocus {
    pub fn new(answer: FocusRequestResult) -> Arc<Self> {
        Arc::new(Self {
            answer: Mutex::new(answer),
            listener: Mutex::new(None),
            requests: AtomicUsize::new(0),
            abandons: AtomicUsize::new(0),
        })
    }

    pub fn answer_with(&self, answer: FocusRequestResult) {
        *self.answer.lock() = answer;
    }

    pub fn deliver(&self, change: FocusChange) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.on_focus_change(change);
        }
    }

    pub fn abandons(&self) -> usize {
        self.abandons.load(Ordering::SeqCst)
    }
}

impl AudioFocusProvider for ScriptedFocus {
    fn request(
        &self,
        _request: &FocusRequest,
        listener: Arc<dyn FocusChangeListener>,
    ) -> BridgeResult<FocusRequestResult> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock() = Some(listener);
        Ok(*self.answer.lock())
    }

    fn abandon(&self) -> BridgeResult<()> {
        self.abandons.fetch_add(1, Ordering::SeqCst);
        *self.listener.lock() = None;
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub engine: FakeEngine,
    pub focus: Arc<ScriptedFocus>,
    pub lock: Arc<NoopKeepAliveLock>,
    pub route: Arc<DesktopRouteMonitor>,
    pub core: CoreConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_focus(FocusRequestResult::Granted)
    }

    pub fn with_focus(answer: FocusRequestResult) -> Self {
        let engine = FakeEngine::default();
        let focus = ScriptedFocus::new(answer);
        let lock = Arc::new(NoopKeepAliveLock::new());
        let route = Arc::new(DesktopRouteMonitor::new());

        let core = CoreConfig::builder()
            .engine_factory(Arc::new(FakeEngineFactory(engine.clone())))
            .focus_provider(focus.clone())
            .keep_alive_lock(lock.clone())
            .route_monitor(route.clone())
            .build()
            .expect("all bridges provided");

        Self {
            engine,
            focus,
            lock,
            route,
            core,
        }
    }

    pub fn coordinator(&self) -> PlaybackCoordinator {
        self.coordinator_with(PlaybackConfig::default())
    }

    pub fn coordinator_with(&self, config: PlaybackConfig) -> PlaybackCoordinator {
        PlaybackCoordinator::from_config(&self.core, config).expect("valid config")
    }
}

pub fn media(id: &str) -> Media {
    Media::new(id, format!("Track {id}"), "Artist", format!("https://cdn.example/{id}.mp3"))
}
