//! Reminder model <-> entity mapper

use bump_core::entities::Reminder;
use bump_core::value_objects::Snowflake;

use crate::models::ReminderModel;

/// Convert ReminderModel to Reminder entity
impl From<ReminderModel> for Reminder {
    fn from(model: ReminderModel) -> Self {
        Reminder {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            channel_id: Snowflake::new(model.channel_id),
            created_at: model.created_at,
        }
    }
}
