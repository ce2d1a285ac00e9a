//! Room runtime configuration.

use std::time::Duration;

/// Settings for the per-room runtime.
///
/// Roster limits are fixed by the game rules
/// ([`MIN_PLAYERS`](spectrum_engine::MIN_PLAYERS) /
/// [`MAX_PLAYERS`](spectrum_engine::MAX_PLAYERS)); this only covers the
/// runtime knobs around them.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Pause between a reveal and the automatic start of the next
    /// round, so players can read the result.
    pub restart_delay: Duration,

    /// Command channel size for room actors; if the channel fills up,
    /// senders wait (bounded channel).
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            restart_delay: Duration::from_secs(5),
            channel_size: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.restart_delay, Duration::from_secs(5));
        assert_eq!(config.channel_size, 64);
    }
}
