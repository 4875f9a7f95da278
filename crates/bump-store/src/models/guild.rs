//! Guild database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the guilds table
#[derive(Debug, Clone, FromRow)]
pub struct GuildModel {
    pub id: i64,
    pub name: String,
    pub feed: Option<i64>,
    pub description: Option<String>,
    pub invite: Option<String>,
    pub color: Option<i32>,
    pub banner: Option<String>,
    pub nsfw: bool,
    pub hub: bool,
    pub sandbox: bool,
    pub features: Vec<String>,
    pub tier_features: Vec<String>,
    pub autobump: bool,
    pub autobump_notifications: Option<i64>,
    pub last_bumped_at: Option<DateTime<Utc>>,
    pub last_bumped_by: Option<i64>,
    pub last_failed_at: Option<DateTime<Utc>>,
    pub blocked: Option<String>,
    pub total_bumps: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildModel {
    /// Check if the guild is blocked from the federation
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked.is_some()
    }
}
