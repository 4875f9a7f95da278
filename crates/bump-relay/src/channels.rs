//! Pub/Sub channel definitions.
//!
//! Defines the channel naming conventions for the shard relay.

/// Channel prefix for fanout requests, one channel per serving shard
pub const FANOUT_CHANNEL_PREFIX: &str = "bump:fanout:";
/// Channel prefix for replies, one channel per requesting shard
pub const REPLY_CHANNEL_PREFIX: &str = "bump:reply:";

/// Relay channel types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayChannel {
    /// Fanout requests served by the given shard
    Fanout(u32),
    /// Replies collected by the given shard
    Reply(u32),
}

impl RelayChannel {
    /// Create the fanout channel served by a shard
    #[must_use]
    pub fn fanout(shard_id: u32) -> Self {
        Self::Fanout(shard_id)
    }

    /// Create the reply channel collected by a shard
    #[must_use]
    pub fn reply(shard_id: u32) -> Self {
        Self::Reply(shard_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Fanout(shard) => format!("{FANOUT_CHANNEL_PREFIX}{shard}"),
            Self::Reply(shard) => format!("{REPLY_CHANNEL_PREFIX}{shard}"),
        }
    }

    /// Parse a channel name back to a `RelayChannel`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(shard) = name.strip_prefix(FANOUT_CHANNEL_PREFIX) {
            return shard.parse().ok().map(Self::Fanout);
        }
        if let Some(shard) = name.strip_prefix(REPLY_CHANNEL_PREFIX) {
            return shard.parse().ok().map(Self::Reply);
        }
        None
    }
}

impl std::fmt::Display for RelayChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
