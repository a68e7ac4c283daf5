//! Pipeline configuration.

use std::time::Duration;

use crate::poll::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delay between assembly status polls
    pub poll_interval: Duration,
    /// Maximum number of status polls before giving up
    pub max_poll_attempts: u32,
    /// Resolve narration audio per scene in addition to media
    pub resolve_audio: bool,
    /// Delete resolved audio references after a successful run
    pub cleanup_media: bool,
    /// How long a finished run keeps `is_running` set, so observers can
    /// display the terminal status before the loading state clears
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            resolve_audio: false,
            cleanup_media: false,
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_secs(
                std::env::var("REELGEN_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_POLL_INTERVAL.as_secs()),
            ),
            max_poll_attempts: std::env::var("REELGEN_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS),
            resolve_audio: std::env::var("REELGEN_RESOLVE_AUDIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            cleanup_media: std::env::var("REELGEN_CLEANUP_MEDIA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            settle_delay: Duration::from_millis(
                std::env::var("REELGEN_SETTLE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
        }
    }
}
