//! PostgreSQL implementation of ReminderStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use bump_core::entities::Reminder;
use bump_core::traits::{ReminderStore, StoreResult};
use bump_core::value_objects::{ShardTopology, Snowflake};

use crate::models::ReminderModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ReminderStore
#[derive(Clone)]
pub struct PgReminderStore {
    pool: PgPool,
}

impl PgReminderStore {
    /// Create a new PgReminderStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    #[instrument(skip(self))]
    async fn for_shard(&self, topology: &ShardTopology) -> StoreResult<Vec<Reminder>> {
        let results = sqlx::query_as::<_, ReminderModel>(
            r"
            SELECT guild_id, user_id, channel_id, created_at
            FROM reminders
            WHERE (guild_id >> 22) % $1 = $2
            ORDER BY created_at
            ",
        )
        .bind(i64::from(topology.shard_count))
        .bind(i64::from(topology.shard_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reminder::from).collect())
    }

    #[instrument(skip(self, reminder), fields(guild_id = %reminder.guild_id, user_id = %reminder.user_id))]
    async fn put(&self, reminder: &Reminder) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO reminders (guild_id, user_id, channel_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (guild_id, user_id) DO UPDATE
            SET channel_id = EXCLUDED.channel_id, created_at = EXCLUDED.created_at
            ",
        )
        .bind(reminder.guild_id.into_inner())
        .bind(reminder.user_id.into_inner())
        .bind(reminder.channel_id.into_inner())
        .bind(reminder.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> StoreResult<()> {
        sqlx::query(
            r"
            DELETE FROM reminders
            WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
