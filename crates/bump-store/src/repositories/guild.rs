//! PostgreSQL implementation of GuildStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use bump_core::entities::Guild;
use bump_core::traits::{GuildStore, StoreResult};
use bump_core::value_objects::{ShardTopology, Snowflake};

use crate::mappers::feature_tags;
use crate::models::GuildModel;

use super::error::{guild_not_found, map_db_error};

/// PostgreSQL implementation of GuildStore
#[derive(Clone)]
pub struct PgGuildStore {
    pool: PgPool,
}

impl PgGuildStore {
    /// Create a new PgGuildStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuildStore for PgGuildStore {
    #[instrument(skip(self))]
    async fn find(&self, id: Snowflake) -> StoreResult<Option<Guild>> {
        let result = sqlx::query_as::<_, GuildModel>(
            r"
            SELECT id, name, feed, description, invite, color, banner,
                   nsfw, hub, sandbox, features, tier_features,
                   autobump, autobump_notifications,
                   last_bumped_at, last_bumped_by, last_failed_at,
                   blocked, total_bumps, created_at, updated_at
            FROM guilds
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Guild::from))
    }

    #[instrument(skip(self))]
    async fn upsert(&self, id: Snowflake, name: &str) -> StoreResult<Guild> {
        let result = sqlx::query_as::<_, GuildModel>(
            r"
            INSERT INTO guilds (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, updated_at = NOW()
            RETURNING id, name, feed, description, invite, color, banner,
                      nsfw, hub, sandbox, features, tier_features,
                      autobump, autobump_notifications,
                      last_bumped_at, last_bumped_by, last_failed_at,
                      blocked, total_bumps, created_at, updated_at
            ",
        )
        .bind(id.into_inner())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Guild::from(result))
    }

    #[instrument(skip(self, guild), fields(guild_id = %guild.id))]
    async fn save(&self, guild: &Guild) -> StoreResult<()> {
        let result = sqlx::query(
            r"
            UPDATE guilds
            SET name = $2, feed = $3, description = $4, invite = $5,
                color = $6, banner = $7, nsfw = $8, hub = $9, sandbox = $10,
                features = $11, tier_features = $12,
                autobump = $13, autobump_notifications = $14,
                last_bumped_at = $15, last_bumped_by = $16, last_failed_at = $17,
                blocked = $18, total_bumps = $19, updated_at = $20
            WHERE id = $1
            ",
        )
        .bind(guild.id.into_inner())
        .bind(&guild.name)
        .bind(guild.feed.map(Snowflake::into_inner))
        .bind(&guild.description)
        .bind(&guild.invite)
        .bind(guild.color)
        .bind(&guild.banner)
        .bind(guild.nsfw)
        .bind(guild.hub)
        .bind(guild.sandbox)
        .bind(feature_tags(&guild.features))
        .bind(feature_tags(&guild.tier_features))
        .bind(guild.autobump)
        .bind(guild.autobump_notifications.map(Snowflake::into_inner))
        .bind(guild.last_bumped_at)
        .bind(guild.last_bumped_by.map(Snowflake::into_inner))
        .bind(guild.last_failed_at)
        .bind(&guild.blocked)
        .bind(guild.total_bumps)
        .bind(guild.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(guild_not_found(guild.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn sample_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Guild>> {
        let results = sqlx::query_as::<_, GuildModel>(
            r"
            SELECT id, name, feed, description, invite, color, banner,
                   nsfw, hub, sandbox, features, tier_features,
                   autobump, autobump_notifications,
                   last_bumped_at, last_bumped_by, last_failed_at,
                   blocked, total_bumps, created_at, updated_at
            FROM guilds
            WHERE (id >> 22) % $1 = $2
              AND feed IS NOT NULL
              AND blocked IS NULL
              AND hub = FALSE
              AND (last_failed_at IS NULL OR last_failed_at <= $3)
            ORDER BY random()
            LIMIT $4
            ",
        )
        .bind(i64::from(topology.shard_count))
        .bind(i64::from(topology.shard_id))
        .bind(failed_cutoff)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Guild::from).collect())
    }

    #[instrument(skip(self))]
    async fn all_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>> {
        let results = sqlx::query_as::<_, GuildModel>(
            r"
            SELECT id, name, feed, description, invite, color, banner,
                   nsfw, hub, sandbox, features, tier_features,
                   autobump, autobump_notifications,
                   last_bumped_at, last_bumped_by, last_failed_at,
                   blocked, total_bumps, created_at, updated_at
            FROM guilds
            WHERE (id >> 22) % $1 = $2
              AND feed IS NOT NULL
              AND blocked IS NULL
              AND (last_failed_at IS NULL OR last_failed_at <= $3)
            ",
        )
        .bind(i64::from(topology.shard_count))
        .bind(i64::from(topology.shard_id))
        .bind(failed_cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Guild::from).collect())
    }

    #[instrument(skip(self))]
    async fn hub_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>> {
        let results = sqlx::query_as::<_, GuildModel>(
            r"
            SELECT id, name, feed, description, invite, color, banner,
                   nsfw, hub, sandbox, features, tier_features,
                   autobump, autobump_notifications,
                   last_bumped_at, last_bumped_by, last_failed_at,
                   blocked, total_bumps, created_at, updated_at
            FROM guilds
            WHERE (id >> 22) % $1 = $2
              AND feed IS NOT NULL
              AND blocked IS NULL
              AND hub = TRUE
              AND (last_failed_at IS NULL OR last_failed_at <= $3)
            ",
        )
        .bind(i64::from(topology.shard_count))
        .bind(i64::from(topology.shard_id))
        .bind(failed_cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Guild::from).collect())
    }

    #[instrument(skip(self))]
    async fn autobump_guilds(&self, topology: &ShardTopology) -> StoreResult<Vec<Guild>> {
        let results = sqlx::query_as::<_, GuildModel>(
            r"
            SELECT id, name, feed, description, invite, color, banner,
                   nsfw, hub, sandbox, features, tier_features,
                   autobump, autobump_notifications,
                   last_bumped_at, last_bumped_by, last_failed_at,
                   blocked, total_bumps, created_at, updated_at
            FROM guilds
            WHERE (id >> 22) % $1 = $2
              AND autobump = TRUE
              AND blocked IS NULL
            ORDER BY id
            ",
        )
        .bind(i64::from(topology.shard_count))
        .bind(i64::from(topology.shard_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Guild::from).collect())
    }
}
