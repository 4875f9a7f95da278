//! Shard topology - which worker owns which slice of the guild population

use crate::value_objects::Snowflake;
use serde::{Deserialize, Serialize};

/// Position of one worker process inside the shard federation.
///
/// Every component that filters guilds by ownership or talks to sibling
/// shards carries one of these instead of loose `(id, count)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTopology {
    /// Index of this worker, `0 <= shard_id < shard_count`
    pub shard_id: u32,
    /// Total number of workers in the federation
    pub shard_count: u32,
}

impl ShardTopology {
    /// Create a topology, clamping `shard_count` to at least one worker
    pub fn new(shard_id: u32, shard_count: u32) -> Self {
        let shard_count = shard_count.max(1);
        Self {
            shard_id: shard_id.min(shard_count - 1),
            shard_count,
        }
    }

    /// Single-worker topology (no siblings)
    pub fn standalone() -> Self {
        Self::new(0, 1)
    }

    /// Shard index owning the given guild
    #[inline]
    pub fn owner_of(&self, guild_id: Snowflake) -> u32 {
        guild_id.shard_index(self.shard_count)
    }

    /// Whether this worker owns the given guild
    #[inline]
    pub fn is_local(&self, guild_id: Snowflake) -> bool {
        self.owner_of(guild_id) == self.shard_id
    }

    /// Indices of every other worker in the federation
    pub fn siblings(&self) -> impl Iterator<Item = u32> + '_ {
        let own = self.shard_id;
        (0..self.shard_count).filter(move |shard| *shard != own)
    }

    /// Number of sibling workers
    #[inline]
    pub fn sibling_count(&self) -> u32 {
        self.shard_count - 1
    }
}

impl Default for ShardTopology {
    fn default() -> Self {
        Self::standalone()
    }
}
