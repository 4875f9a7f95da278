//! # bump-relay
//!
//! Redis pub/sub implementation of the inter-shard transport.
//!
//! ## Overview
//!
//! Each shard owns two channels: a fanout channel it serves requests on and
//! a reply channel it collects answers on. A bump broadcast publishes one
//! request envelope to every sibling's fanout channel, then gathers reply
//! envelopes off its own reply channel until the deadline. Siblings that
//! never answer are reported as timeouts, not errors.
//!
//! ## Example
//!
//! ```ignore
//! use bump_relay::{FanoutListener, RedisShardTransport, RelayConfig, RelayPool};
//!
//! let pool = RelayPool::new(RelayPoolConfig::default())?;
//! let transport = RedisShardTransport::new(pool.clone(), topology, RelayConfig::default());
//! let listener = FanoutListener::spawn(RelayConfig::default(), topology, pool, handler);
//!
//! let replies = transport.broadcast(&request).await;
//! ```

pub mod channels;
pub mod config;
pub mod listener;
pub mod pool;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use channels::{RelayChannel, FANOUT_CHANNEL_PREFIX, REPLY_CHANNEL_PREFIX};
pub use config::RelayConfig;
pub use listener::FanoutListener;
pub use pool::{RelayPool, RelayPoolConfig, RelayPoolError, RelayResult};
pub use protocol::{FanoutEnvelope, ReplyEnvelope};
pub use transport::RedisShardTransport;
