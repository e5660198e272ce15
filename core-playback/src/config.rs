//! # Playback Configuration
//!
//! Tunables for focus requests, ducking and observer channels.

use bridge_traits::{AudioUsage, ContentType, FocusRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// Playback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Content type reported with focus requests.
    ///
    /// Default: `Music`.
    #[serde(default = "default_content_type")]
    pub content_type: ContentType,

    /// Whether the platform may answer a focus request with a delayed grant.
    ///
    /// Default: false.
    #[serde(default)]
    pub accept_delayed_focus: bool,

    /// Engine volume while another app holds transient, duckable focus.
    ///
    /// Default: 0.2.
    #[serde(default = "default_duck_volume")]
    pub duck_volume: f32,

    /// Period of position ticks while playing.
    ///
    /// Default: 500ms.
    #[serde(default = "default_position_tick_interval")]
    pub position_tick_interval: Duration,

    /// Per-subscriber buffer of the action, error and position channels.
    ///
    /// Default: 64.
    #[serde(default = "default_hub_event_capacity")]
    pub hub_event_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            content_type: default_content_type(),
            accept_delayed_focus: false,
            duck_volume: default_duck_volume(),
            position_tick_interval: default_position_tick_interval(),
            hub_event_capacity: default_hub_event_capacity(),
        }
    }
}

impl PlaybackConfig {
    /// Configuration for spoken-word content (podcasts, audiobooks).
    ///
    /// Speech is better paused than ducked, so the duck volume is zero.
    pub fn speech() -> Self {
        Self {
            content_type: ContentType::Speech,
            duck_volume: 0.0,
            ..Default::default()
        }
    }

    /// Focus request sent to the platform.
    pub fn focus_request(&self) -> FocusRequest {
        FocusRequest {
            usage: AudioUsage::Media,
            content_type: self.content_type,
            accept_delayed: self.accept_delayed_focus,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.duck_volume) {
            return Err(PlaybackError::InvalidConfig(
                "duck_volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.position_tick_interval.is_zero() {
            return Err(PlaybackError::InvalidConfig(
                "position_tick_interval must be > 0".to_string(),
            ));
        }

        if self.hub_event_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "hub_event_capacity must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_content_type() -> ContentType {
    ContentType::Music
}

fn default_duck_volume() -> f32 {
    0.2
}

fn default_position_tick_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_hub_event_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.content_type, ContentType::Music);
        assert!(!config.accept_delayed_focus);
        assert_eq!(config.duck_volume, 0.2);
        assert_eq!(config.position_tick_interval, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_focus_request_mirrors_config() {
        let request = PlaybackConfig::speech().focus_request();
        assert_eq!(request.usage, AudioUsage::Media);
        assert_eq!(request.content_type, ContentType::Speech);
        assert!(!request.accept_delayed);
    }

    #[test]
    fn test_validation() {
        let bad_duck = PlaybackConfig {
            duck_volume: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad_duck.validate(), Err(PlaybackError::InvalidConfig(_))));

        let zero_tick = PlaybackConfig {
            position_tick_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_tick.validate().is_err());

        let zero_capacity = PlaybackConfig {
            hub_event_capacity: 0,
            ..Default::default()
        };
        assert!(zero_capacity.validate().is_err());
    }

    #[test]
    fn test_serde_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"duck_volume":0.5}"#).unwrap();
        assert_eq!(config.duck_volume, 0.5);
        assert_eq!(config.hub_event_capacity, 64);
        assert_eq!(config.content_type, ContentType::Music);
    }
}
