//! Inter-shard transport contract - SBLP-style fanout coordination
//!
//! One shard asks every sibling to run its own local fanout for a source
//! guild and report how many targets it reached. The transport promises
//! nothing about unreachable siblings beyond surfacing them as timeouts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{BumpKind, BumpMessage};
use crate::value_objects::Snowflake;

/// A fanout request as it travels between shards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutRequest {
    /// Guild being advertised
    pub source_id: Snowflake,
    /// Policy the receiving shard should select with
    pub kind: BumpKind,
    /// Message rendered once by the initiator
    pub message: BumpMessage,
}

/// One sibling's answer to a broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardReply {
    pub shard_id: u32,
    /// Reached count, or `None` when the sibling never answered in time
    pub reached: Option<u64>,
}

impl ShardReply {
    /// Count contributed to the external total; silent siblings add zero
    pub fn contribution(&self) -> u64 {
        self.reached.unwrap_or(0)
    }
}

// ============================================================================
// Shard Transport
// ============================================================================

/// Outbound side: broadcast a fanout request to every sibling shard.
///
/// Implementations collect whatever replies arrive before their deadline and
/// mark the rest as timed out; they never fail the call because a subset of
/// the federation is unreachable.
#[async_trait]
pub trait ShardTransport: Send + Sync {
    /// One reply slot per sibling, timeout or not
    async fn broadcast(&self, request: &FanoutRequest) -> Vec<ShardReply>;
}

// ============================================================================
// Fanout Handler
// ============================================================================

/// Inbound side: what the transport listener invokes when a sibling asks this
/// shard to fan out locally. Returns the number of guilds reached; every
/// failure mode inside the handler collapses to a smaller count.
#[async_trait]
pub trait FanoutHandler: Send + Sync {
    async fn handle_fanout(&self, request: &FanoutRequest) -> u64;
}
