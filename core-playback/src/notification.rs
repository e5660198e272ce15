//! # Notification Policy
//!
//! Pure mapping from [`PlaybackState`] to what the persistent media
//! notification should show. Rendering (layouts, artwork loading, the
//! foreground service itself) belongs to the host through
//! [`NotificationRenderer`].
//!
//! | State                  | Directive        | Primary button |
//! |------------------------|------------------|----------------|
//! | `Buffering`, `Playing` | `ShowForeground` | pause          |
//! | `Paused`, `Completed`  | `ShowDetached`   | play           |
//! | `Idle`, `Stopped`      | `Dismiss`        | none           |

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::state::{Action, Media, PlaybackState, QueueData};

/// What the host should do with the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationDirective {
    /// Show and keep the service in the foreground.
    ShowForeground,
    /// Keep the notification but let the service leave the foreground.
    ShowDetached,
    Dismiss,
}

pub fn directive_for(state: &PlaybackState) -> NotificationDirective {
    match state {
        PlaybackState::Buffering { .. } | PlaybackState::Playing { .. } => {
            NotificationDirective::ShowForeground
        }
        PlaybackState::Paused { .. } | PlaybackState::Completed { .. } => {
            NotificationDirective::ShowDetached
        }
        PlaybackState::Idle | PlaybackState::Stopped { .. } => NotificationDirective::Dismiss,
    }
}

/// Notification button. The host reports presses by [`id`](Self::id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationButton {
    Previous,
    Play,
    Pause,
    Next,
    Stop,
}

impl NotificationButton {
    pub fn id(&self) -> &'static str {
        match self {
            NotificationButton::Previous => "previous",
            NotificationButton::Play => "play",
            NotificationButton::Pause => "pause",
            NotificationButton::Next => "next",
            NotificationButton::Stop => "stop",
        }
    }

    pub fn action(&self) -> Action {
        match self {
            NotificationButton::Previous => Action::SkipPrevious,
            NotificationButton::Play => Action::Resume,
            NotificationButton::Pause => Action::Pause,
            NotificationButton::Next => Action::SkipNext,
            NotificationButton::Stop => Action::Stop,
        }
    }
}

impl FromStr for NotificationButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "previous" => Ok(NotificationButton::Previous),
            "play" => Ok(NotificationButton::Play),
            "pause" => Ok(NotificationButton::Pause),
            "next" => Ok(NotificationButton::Next),
            "stop" => Ok(NotificationButton::Stop),
            other => Err(format!("Unknown notification button: {other}")),
        }
    }
}

/// Map a button id reported by the host to an [`Action`].
pub fn action_for_button(id: &str) -> Option<Action> {
    id.parse::<NotificationButton>().ok().map(|b| b.action())
}

/// Everything a renderer needs to draw the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub media: Media,
    pub playing: bool,
    pub buttons: Vec<NotificationButton>,
}

impl NotificationContent {
    /// Build content for `state`. `None` when the notification is dismissed.
    ///
    /// Skip buttons only appear when the queue has somewhere to go.
    pub fn for_state(state: &PlaybackState, queue: &QueueData) -> Option<Self> {
        let media = match state {
            PlaybackState::Idle | PlaybackState::Stopped { .. } => return None,
            other => other.media()?.clone(),
        };
        let playing = directive_for(state) == NotificationDirective::ShowForeground;

        let mut buttons = Vec::with_capacity(4);
        if queue.previous().is_some() {
            buttons.push(NotificationButton::Previous);
        }
        buttons.push(if playing {
            NotificationButton::Pause
        } else {
            NotificationButton::Play
        });
        if queue.next().is_some() {
            buttons.push(NotificationButton::Next);
        }
        buttons.push(NotificationButton::Stop);

        Some(Self {
            media,
            playing,
            buttons,
        })
    }
}

/// Host side of the notification.
///
/// Called from a tokio task; implementations hand the work to the platform
/// UI thread and return immediately.
pub trait NotificationRenderer: Send + Sync {
    fn render(&self, directive: NotificationDirective, content: Option<NotificationContent>);
}
