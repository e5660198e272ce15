//! # Event Channels
//!
//! Typed fan-out channels used by the playback core to reach its observers.
//!
//! ## Overview
//!
//! Two kinds of channel cover everything observers need:
//! - **EventBus**: `tokio::sync::broadcast` wrapper for one-shot events
//!   (actions, errors, position ticks). No replay; slow subscribers observe
//!   `RecvError::Lagged` and keep going.
//! - **StateChannel**: `tokio::sync::watch` wrapper for current values
//!   (playback state, queue). Late subscribers see the latest value first.
//!
//! ```text
//!                  publish         ┌──────────────┐   subscribe   ┌────────────┐
//! ┌─────────────┐ ───────────────> │ StateChannel ├─────────────> │Notification│
//! │ Coordinator │                  └──────────────┘               └────────────┘
//! │             │    emit          ┌──────────────┐   subscribe   ┌────────────┐
//! └─────────────┘ ───────────────> │   EventBus   ├─────────────> │     UI     │
//!                                  └──────────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, StateChannel};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let errors: EventBus<String> = EventBus::new(16);
//! let mut stream = errors.stream();
//! errors.emit("decoder failed".to_string()).ok();
//! assert_eq!(stream.recv().await.unwrap(), "decoder failed");
//!
//! let state = StateChannel::new(0u32);
//! state.publish(7);
//! assert_eq!(*state.subscribe().borrow(), 7);
//! # }
//! ```

use std::fmt;

use tokio::sync::broadcast::{self, error::RecvError, error::SendError, Receiver};
use tokio::sync::watch;

/// Buffer used when a bus is created without an explicit capacity.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for one-shot events.
///
/// Cloning the bus clones the sending half; every `subscribe()` creates an
/// independent receiver that sees events emitted after it was created.
pub struct EventBus<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// A subscriber that falls further behind receives
    /// `RecvError::Lagged` with the number of events it missed.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of receivers, or the event back when nobody is
    /// listening. Callers that do not care about delivery ignore the error.
    pub fn emit(&self, event: T) -> Result<usize, SendError<T>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<T> {
        self.sender.subscribe()
    }

    /// Subscribes and wraps the receiver in an [`EventStream`].
    pub fn stream(&self) -> EventStream<T> {
        EventStream::new(self.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional filter.
pub struct EventStream<T> {
    receiver: Receiver<T>,
    filter: Option<EventFilter<T>>,
}

impl<T: Clone> EventStream<T> {
    pub fn new(receiver: Receiver<T>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &T) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<T, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking receive. `None` when nothing matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<T, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// State Channel
// ============================================================================

/// Current-value channel. Subscribers always start from the latest value.
pub struct StateChannel<T> {
    sender: watch::Sender<T>,
}

impl<T> StateChannel<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Replaces the current value and notifies every subscriber.
    ///
    /// Works with zero subscribers; the value is kept for later ones.
    pub fn publish(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Stores `value` but wakes subscribers only when `changed(current, &value)`
    /// holds. Readers calling `borrow()` always see the stored value.
    ///
    /// Returns whether subscribers were notified.
    pub fn publish_if<F>(&self, value: T, changed: F) -> bool
    where
        F: FnOnce(&T, &T) -> bool,
    {
        self.sender.send_if_modified(|current| {
            let notify = changed(current, &value);
            *current = value;
            notify
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> StateChannel<T> {
    pub fn current(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for StateChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateChannel")
            .field("current", &*self.sender.borrow())
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Tick(u64),
        Error(String),
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_returns_event() {
        let bus: EventBus<TestEvent> = EventBus::new(8);
        let err = bus.emit(TestEvent::Tick(1)).unwrap_err();
        assert_eq!(err.0, TestEvent::Tick(1));
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(TestEvent::Tick(5)).unwrap(), 2);
        assert_eq!(a.recv().await.unwrap(), TestEvent::Tick(5));
        assert_eq!(b.recv().await.unwrap(), TestEvent::Tick(5));
    }

    #[tokio::test]
    async fn test_no_replay_for_late_subscribers() {
        let bus = EventBus::new(8);
        let _early = bus.subscribe();
        bus.emit(TestEvent::Tick(1)).unwrap();

        let mut late = bus.stream();
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(8);
        let mut errors = bus
            .stream()
            .filter(|event| matches!(event, TestEvent::Error(_)));

        bus.emit(TestEvent::Tick(1)).unwrap();
        bus.emit(TestEvent::Error("boom".into())).unwrap();

        let event = tokio::time::timeout(Duration::from_millis(100), errors.recv())
            .await
            .expect("timed out")
            .unwrap();
        assert_eq!(event, TestEvent::Error("boom".into()));
        assert!(errors.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut stream = bus.stream();

        for i in 0..5 {
            bus.emit(TestEvent::Tick(i)).unwrap();
        }

        match stream.try_recv() {
            Some(Err(RecvError::Lagged(n))) => assert_eq!(n, 3),
            other => panic!("expected lag, got {other:?}"),
        }
        assert_eq!(stream.try_recv().unwrap().unwrap(), TestEvent::Tick(3));
    }

    #[tokio::test]
    async fn test_closed_after_bus_dropped() {
        let bus: EventBus<TestEvent> = EventBus::default();
        let mut stream = bus.stream();
        drop(bus);
        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn test_state_channel_replays_latest() {
        let channel = StateChannel::new(1u32);
        channel.publish(2);
        channel.publish(3);

        let rx = channel.subscribe();
        assert_eq!(*rx.borrow(), 3);
        assert_eq!(channel.current(), 3);
    }

    #[tokio::test]
    async fn test_state_channel_publish_if_dedupes() {
        let channel = StateChannel::new((1u32, "a"));
        let mut rx = channel.subscribe();
        rx.borrow_and_update();

        // Same identity, different payload: stored without waking anyone
        assert!(!channel.publish_if((1, "b"), |old, new| old.0 != new.0));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(channel.current(), (1, "b"));

        assert!(channel.publish_if((2, "c"), |old, new| old.0 != new.0));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), (2, "c"));
    }

    #[test]
    fn test_debug_output() {
        let bus: EventBus<TestEvent> = EventBus::new(4);
        let _rx = bus.subscribe();
        assert!(format!("{:?}", bus).contains("subscriber_count: 1"));

        let channel = StateChannel::new(9u8);
        assert!(format!("{:?}", channel).contains("current: 9"));
    }
}
