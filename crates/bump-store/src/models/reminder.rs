//! Reminder database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the reminders table
#[derive(Debug, Clone, FromRow)]
pub struct ReminderModel {
    pub guild_id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub created_at: DateTime<Utc>,
}
