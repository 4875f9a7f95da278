//! # bump-core
//!
//! Domain layer for the bump fanout engine: guild records, fanout policies,
//! pure calculators (partitioning, cooldowns, channel issues), and the traits
//! every collaborator (persistence, platform session, inter-shard transport,
//! vote oracle) must implement.
//! This crate has zero dependencies on infrastructure (database, Redis, etc.).

pub mod cooldown;
pub mod entities;
pub mod error;
pub mod issues;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{BumpKind, BumpMessage, DeliveryOutcome, Feature, Guild, Notice, Reminder};
pub use error::DomainError;
pub use issues::ChannelIssue;
pub use traits::{
    ChannelInfo, FanoutHandler, FanoutRequest, FeedGateway, GatewayError, GuildStore,
    ReminderStore, RoleOverwrite, ShardReply, ShardTransport, StoreResult, VoteSource,
};
pub use value_objects::{Permissions, ShardTopology, Snowflake, SnowflakeParseError};
