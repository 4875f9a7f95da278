//! Database models - SQLx-compatible structs for PostgreSQL tables

mod guild;
mod reminder;

pub use guild::GuildModel;
pub use reminder::ReminderModel;
