//! # Playback Data Model
//!
//! Values exchanged between the coordinator, its observers and the host:
//! [`PlaybackState`], [`Media`], [`QueueData`] and [`Action`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Media
// ============================================================================

/// A playable item. Two `Media` values are the same item when their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Artwork reference resolved by the host image pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    pub stream_url: String,
}

impl Media {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork: None,
            stream_url: stream_url.into(),
        }
    }

    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = Some(artwork.into());
        self
    }

    pub fn is_same_item(&self, other: &Media) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Media {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Media {}

// ============================================================================
// Playback State
// ============================================================================

/// Authoritative playback state. Exactly one variant is current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    /// No media loaded.
    #[default]
    Idle,
    Buffering { media: Media, position: Duration },
    Playing { media: Media, position: Duration },
    Paused { media: Media, position: Duration },
    Completed { media: Media, position: Duration },
    /// Engine released. Terminal for the session.
    Stopped { position: Duration },
}

/// Variant tag of a [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Idle,
    Buffering,
    Playing,
    Paused,
    Completed,
    Stopped,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What UI diffing compares: the variant and the media id, never position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateIdentity {
    pub kind: StateKind,
    pub media_id: Option<String>,
}

impl PlaybackState {
    pub fn kind(&self) -> StateKind {
        match self {
            PlaybackState::Idle => StateKind::Idle,
            PlaybackState::Buffering { .. } => StateKind::Buffering,
            PlaybackState::Playing { .. } => StateKind::Playing,
            PlaybackState::Paused { .. } => StateKind::Paused,
            PlaybackState::Completed { .. } => StateKind::Completed,
            PlaybackState::Stopped { .. } => StateKind::Stopped,
        }
    }

    pub fn media(&self) -> Option<&Media> {
        match self {
            PlaybackState::Buffering { media, .. }
            | PlaybackState::Playing { media, .. }
            | PlaybackState::Paused { media, .. }
            | PlaybackState::Completed { media, .. } => Some(media),
            PlaybackState::Idle | PlaybackState::Stopped { .. } => None,
        }
    }

    pub fn position(&self) -> Duration {
        match self {
            PlaybackState::Idle => Duration::ZERO,
            PlaybackState::Buffering { position, .. }
            | PlaybackState::Playing { position, .. }
            | PlaybackState::Paused { position, .. }
            | PlaybackState::Completed { position, .. }
            | PlaybackState::Stopped { position } => *position,
        }
    }

    pub fn identity(&self) -> StateIdentity {
        StateIdentity {
            kind: self.kind(),
            media_id: self.media().map(|media| media.id.clone()),
        }
    }

    /// Same variant and same media, regardless of position.
    pub fn same_identity(&self, other: &PlaybackState) -> bool {
        self.kind() == other.kind()
            && self.media().map(|m| m.id.as_str()) == other.media().map(|m| m.id.as_str())
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackState::Stopped { .. })
    }

    /// Builds a state of `kind` carrying `media` and `position`.
    ///
    /// `Idle` and `Stopped` drop the media; every other kind needs it and
    /// yields `None` without it.
    pub fn from_parts(kind: StateKind, media: Option<Media>, position: Duration) -> Option<Self> {
        Some(match kind {
            StateKind::Idle => PlaybackState::Idle,
            StateKind::Stopped => PlaybackState::Stopped { position },
            StateKind::Buffering => PlaybackState::Buffering { media: media?, position },
            StateKind::Playing => PlaybackState::Playing { media: media?, position },
            StateKind::Paused => PlaybackState::Paused { media: media?, position },
            StateKind::Completed => PlaybackState::Completed { media: media?, position },
        })
    }
}

// ============================================================================
// Queue
// ============================================================================

/// Ordered play queue with the index of the current item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueData {
    pub items: Vec<Media>,
    pub index: usize,
}

impl QueueData {
    pub fn new(items: Vec<Media>, index: usize) -> Self {
        Self { items, index }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current(&self) -> Option<&Media> {
        self.items.get(self.index)
    }

    /// Item after the current one. No wrap-around.
    pub fn next(&self) -> Option<&Media> {
        self.items.get(self.index.checked_add(1)?)
    }

    /// Item before the current one. No wrap-around.
    pub fn previous(&self) -> Option<&Media> {
        self.items.get(self.index.checked_sub(1)?)
    }

    /// Copy of the queue pointing at `index`, or `None` when out of range.
    pub fn with_index(&self, index: usize) -> Option<QueueData> {
        (index < self.items.len()).then(|| QueueData {
            items: self.items.clone(),
            index,
        })
    }

    pub fn position_of(&self, media: &Media) -> Option<usize> {
        self.items.iter().position(|item| item.is_same_item(media))
    }
}

// ============================================================================
// Actions
// ============================================================================

/// One-shot command from UI or notification buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Play the given media, or resume the current one when `None`.
    Play(Option<Media>),
    Pause,
    Resume,
    Stop,
    SeekTo(Duration),
    SkipNext,
    SkipPrevious,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Play(_) => "play",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Stop => "stop",
            Action::SeekTo(_) => "seek_to",
            Action::SkipNext => "skip_next",
            Action::SkipPrevious => "skip_previous",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(id: &str) -> Media {
        Media::new(id, format!("Title {id}"), "Artist", format!("https://cdn/{id}.mp3"))
    }

    #[test]
    fn test_media_identity_is_id() {
        let a = media("a");
        let mut renamed = media("a");
        renamed.title = "Other".into();
        assert_eq!(a, renamed);
        assert_ne!(a, media("b"));
    }

    #[test]
    fn test_identity_ignores_position() {
        let early = PlaybackState::Playing {
            media: media("a"),
            position: Duration::from_secs(1),
        };
        let late = PlaybackState::Playing {
            media: media("a"),
            position: Duration::from_secs(9),
        };
        assert!(early.same_identity(&late));
        assert_eq!(early.identity(), late.identity());
        assert_ne!(early, late);

        let paused = PlaybackState::Paused {
            media: media("a"),
            position: Duration::from_secs(9),
        };
        assert!(!late.same_identity(&paused));
    }

    #[test]
    fn test_accessors() {
        let stopped = PlaybackState::Stopped {
            position: Duration::from_millis(1500),
        };
        assert_eq!(stopped.kind(), StateKind::Stopped);
        assert!(stopped.media().is_none());
        assert_eq!(stopped.position(), Duration::from_millis(1500));
        assert!(stopped.is_stopped());

        assert_eq!(PlaybackState::default().kind(), StateKind::Idle);
        assert_eq!(PlaybackState::Idle.position(), Duration::ZERO);
    }

    #[test]
    fn test_from_parts_requires_media() {
        assert!(PlaybackState::from_parts(StateKind::Playing, None, Duration::ZERO).is_none());
        let idle = PlaybackState::from_parts(StateKind::Idle, Some(media("a")), Duration::ZERO);
        assert_eq!(idle, Some(PlaybackState::Idle));
        let paused =
            PlaybackState::from_parts(StateKind::Paused, Some(media("a")), Duration::from_secs(2))
                .unwrap();
        assert_eq!(paused.media().map(|m| m.id.as_str()), Some("a"));
    }

    #[test]
    fn test_queue_navigation() {
        let queue = QueueData::new(vec![media("a"), media("b"), media("c")], 0);
        assert_eq!(queue.current().unwrap().id, "a");
        assert_eq!(queue.next().unwrap().id, "b");
        assert!(queue.previous().is_none());

        let last = queue.with_index(2).unwrap();
        assert!(last.next().is_none());
        assert_eq!(last.previous().unwrap().id, "b");
        assert!(queue.with_index(3).is_none());
        assert_eq!(queue.position_of(&media("c")), Some(2));
    }

    #[test]
    fn test_state_serialization() {
        let state = PlaybackState::Paused {
            media: media("a"),
            position: Duration::from_secs(3),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "paused");
        assert_eq!(json["media"]["id"], "a");

        let back: PlaybackState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Play(None).name(), "play");
        assert_eq!(Action::SeekTo(Duration::from_secs(1)).name(), "seek_to");
    }
}
