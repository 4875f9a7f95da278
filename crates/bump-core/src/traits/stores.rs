//! Persistence traits (ports) - what the engine needs from storage
//!
//! The engine defines what it needs; the storage crate provides the
//! implementation. Every query that narrows by ownership takes the shard
//! topology so the partition filter lives next to the rest of the predicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Guild, Reminder};
use crate::error::DomainError;
use crate::value_objects::{ShardTopology, Snowflake};

/// Result type for store operations
pub type StoreResult<T> = Result<T, DomainError>;

// ============================================================================
// Guild Store
// ============================================================================

#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Find a guild by id
    async fn find(&self, id: Snowflake) -> StoreResult<Option<Guild>>;

    /// Create the record for a newly observed guild, or refresh the display
    /// name of an existing one. Idempotent.
    async fn upsert(&self, id: Snowflake, name: &str) -> StoreResult<Guild>;

    /// Persist the full record
    async fn save(&self, guild: &Guild) -> StoreResult<()>;

    /// Uniform random sample of up to `limit` non-hub delivery targets owned
    /// by this shard. `failed_cutoff` bounds the exclusion window: guilds
    /// with `last_failed_at` after it are left out.
    async fn sample_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Guild>>;

    /// Every eligible delivery target owned by this shard, hubs included
    async fn all_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>>;

    /// Hub-flagged delivery targets owned by this shard
    async fn hub_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>>;

    /// Non-blocked guilds on this shard with autobump switched on
    async fn autobump_guilds(&self, topology: &ShardTopology) -> StoreResult<Vec<Guild>>;
}

// ============================================================================
// Reminder Store
// ============================================================================

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders whose guild is owned by this shard
    async fn for_shard(&self, topology: &ShardTopology) -> StoreResult<Vec<Reminder>>;

    /// Create or replace the reminder for (guild, user)
    async fn put(&self, reminder: &Reminder) -> StoreResult<()>;

    /// Drop the reminder for (guild, user); missing rows are fine
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> StoreResult<()>;
}
