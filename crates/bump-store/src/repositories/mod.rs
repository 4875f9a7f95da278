//! Store implementations
//!
//! PostgreSQL implementations of the store traits defined in bump-core.
//! Shard ownership is enforced in SQL: `(id >> 22) % shard_count` keeps
//! the partition predicate next to the rest of each query.

mod error;
mod guild;
mod reminder;

pub use guild::PgGuildStore;
pub use reminder::PgReminderStore;
