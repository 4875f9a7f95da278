//! Platform session contract - what the engine needs from the chat platform
//!
//! A shard process only ever sees the slice of the platform its own
//! connection holds; every question below is answered from that live session,
//! never from storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{BumpMessage, Notice};
use crate::value_objects::{Permissions, Snowflake};

/// Live channel data resolved from the platform session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    /// Channel is marked age-restricted on the platform side
    pub nsfw: bool,
}

/// One role's permission overwrite on a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverwrite {
    pub role_id: Snowflake,
    /// Whether this overwrite targets the `@everyone`-equivalent role
    pub everyone: bool,
    pub allow: Permissions,
    pub deny: Permissions,
}

/// Errors surfaced by the platform when sending
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The platform refused the message (closed DMs, deleted target, ...)
    #[error("delivery refused: {0}")]
    Refused(String),

    /// Connection-level failure of unknown cause
    #[error("platform transport error: {0}")]
    Transport(String),
}

/// Session-scoped view of the chat platform
///
/// Implemented by the real platform binding (excluded glue) and by test
/// fakes. All lookups answer `None`/`false` rather than erroring when the
/// session simply does not hold the entity right now.
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Whether this shard currently holds a live session for the guild
    async fn has_guild(&self, guild_id: Snowflake) -> bool;

    /// Resolve a channel within a guild, if the session sees it
    async fn resolve_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> Option<ChannelInfo>;

    /// Effective permissions of the bot user in the channel
    async fn bot_permissions(&self, channel: &ChannelInfo) -> Permissions;

    /// Role permission overwrites configured on the channel
    async fn role_overwrites(&self, channel: &ChannelInfo) -> Vec<RoleOverwrite>;

    /// Owner of the guild, if the session can answer
    async fn guild_owner(&self, guild_id: Snowflake) -> Option<Snowflake>;

    /// Id of the bot user this shard is connected as
    fn bot_user_id(&self) -> Snowflake;

    /// Deliver a bump into a feed channel
    async fn send_bump(
        &self,
        channel: &ChannelInfo,
        message: &BumpMessage,
    ) -> Result<(), GatewayError>;

    /// Post a plain notice into a channel
    async fn send_notice(&self, channel: &ChannelInfo, notice: &Notice) -> Result<(), GatewayError>;

    /// Send a private notice to a user
    async fn send_direct(&self, user_id: Snowflake, notice: &Notice) -> Result<(), GatewayError>;
}
