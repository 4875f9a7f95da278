//! Relay tuning knobs

use std::time::Duration;

/// Configuration for both sides of the relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How long a broadcast waits for sibling replies
    pub reply_timeout: Duration,
    /// Delay before the listener reconnects after a connection loss
    pub reconnect_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&bump_common::BumpConfig> for RelayConfig {
    fn from(config: &bump_common::BumpConfig) -> Self {
        Self {
            reply_timeout: Duration::from_secs(config.reply_timeout_secs),
            ..Default::default()
        }
    }
}
