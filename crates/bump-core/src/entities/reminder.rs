//! Reminder entity - a request to ping a user when a guild can next bump

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// One pending bump reminder, keyed by (guild, user)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    /// Channel the availability ping is delivered to
    pub channel_id: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Create a reminder for the given user in the given guild channel
    pub fn new(guild_id: Snowflake, user_id: Snowflake, channel_id: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            channel_id,
            created_at: Utc::now(),
        }
    }
}
