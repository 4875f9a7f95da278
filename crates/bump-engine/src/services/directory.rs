//! Guild directory
//!
//! Entry point for guild records: every observed interaction funnels through
//! the idempotent upsert, and the manual bump path loads records through
//! `require` so unknown and blocked guilds are rejected up front.

use bump_core::{DomainError, Guild, Snowflake};
use tracing::{debug, instrument};

use super::context::EngineContext;
use super::error::EngineResult;

/// Guild directory
pub struct GuildDirectory<'a> {
    ctx: &'a EngineContext,
}

impl<'a> GuildDirectory<'a> {
    /// Create a new GuildDirectory
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Record that a guild was seen under the given display name.
    ///
    /// Creates the record on first contact and refreshes the name after
    /// that. Idempotent; safe to call on every interaction.
    #[instrument(skip(self, name))]
    pub async fn observe(&self, id: Snowflake, name: &str) -> EngineResult<Guild> {
        let guild = self.ctx.guilds().upsert(id, name).await?;
        debug!(guild_id = %guild.id, "Guild observed");
        Ok(guild)
    }

    /// Load a guild that must exist and must not be blocked.
    #[instrument(skip(self))]
    pub async fn require(&self, id: Snowflake) -> EngineResult<Guild> {
        let guild = self
            .ctx
            .guilds()
            .find(id)
            .await?
            .ok_or(DomainError::GuildNotFound(id))?;
        if guild.blocked.is_some() {
            return Err(DomainError::GuildBlocked(id).into());
        }
        Ok(guild)
    }
}
