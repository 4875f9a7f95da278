//! Shard coordinator
//!
//! Runs one bump across the whole federation: local selection and delivery
//! concurrently with a broadcast asking every sibling shard to fan out for
//! the same source guild, then a fan-in of the counts they report. Silent
//! siblings degrade the external count to zero, never the bump itself.

use bump_core::cooldown::bump_cooldown;
use bump_core::entities::{BumpKind, BumpPlan, DeliveryReport};
use bump_core::traits::{FanoutRequest, ShardReply};
use bump_core::{BumpMessage, Guild, Snowflake};
use chrono::Utc;
use tracing::{info, instrument};

use super::context::EngineContext;
use super::delivery::DeliveryExecutor;
use super::error::{EngineError, EngineResult};
use super::selector::TargetSelector;

/// Result of one federation-wide bump
#[derive(Debug, Clone)]
pub struct BumpSummary {
    /// Guilds this shard delivered to, in delivery order
    pub reached_locally: Vec<Guild>,
    /// Sum of the counts sibling shards reported
    pub external_count: u64,
}

impl BumpSummary {
    /// Total guilds reached across the federation
    pub fn total_reached(&self) -> u64 {
        self.reached_locally.len() as u64 + self.external_count
    }
}

/// Shard coordinator
pub struct BumpCoordinator<'a> {
    ctx: &'a EngineContext,
}

impl<'a> BumpCoordinator<'a> {
    /// Create a new BumpCoordinator
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Reject the bump while the guild's cooldown is still running.
    ///
    /// The vote oracle is consulted for the acting user (best-effort, a
    /// silent oracle means not voted); the remaining interval comes back as
    /// a typed error so callers can show it.
    #[instrument(skip(self, guild))]
    pub async fn check_cooldown(&self, guild: &Guild, actor: Snowflake) -> EngineResult<()> {
        let has_voted = self.ctx.votes().has_voted(actor).await;
        let cooldown = bump_cooldown(guild, false, has_voted);
        let now = Utc::now();
        if let Some(next) = guild.next_bump_at(cooldown) {
            if next > now {
                return Err(EngineError::OnCooldown {
                    remaining: next - now,
                });
            }
        }
        Ok(())
    }

    /// Run one bump for the source guild with an already-rendered message.
    ///
    /// The fanout plan comes from the guild's configuration; local delivery
    /// and the sibling broadcast run concurrently and both are awaited. On
    /// completion the source's bump counters are recorded under `actor` and
    /// persisted. Sandbox bumps idle for the settle delay before returning.
    #[instrument(skip(self, source, message))]
    pub async fn bump(
        &self,
        source: &Guild,
        message: &BumpMessage,
        actor: Snowflake,
    ) -> EngineResult<BumpSummary> {
        if !self.ctx.ready().is_ready() {
            return Err(EngineError::NotReady);
        }

        let plan = BumpPlan::for_guild(source);
        info!(
            source_id = %source.id,
            local = plan.local.as_str(),
            siblings = plan.siblings.as_str(),
            "Coordinating bump"
        );

        let request = FanoutRequest {
            source_id: source.id,
            kind: plan.siblings,
            message: message.clone(),
        };
        let (report, replies) = tokio::join!(
            self.run_local(source, plan.local, message),
            self.ctx.transport().broadcast(&request),
        );
        let report = report?;
        let external_count: u64 = replies.iter().map(ShardReply::contribution).sum();

        if plan.local == BumpKind::Sandbox {
            tokio::time::sleep(self.ctx.settings().sandbox_settle).await;
        }

        let mut updated = source.clone();
        updated.record_bump(actor, Utc::now());
        self.ctx.guilds().save(&updated).await?;

        info!(
            source_id = %source.id,
            reached_locally = report.reached_count(),
            external_count,
            "Bump complete"
        );
        Ok(BumpSummary {
            reached_locally: report.reached,
            external_count,
        })
    }

    async fn run_local(
        &self,
        source: &Guild,
        kind: BumpKind,
        message: &BumpMessage,
    ) -> EngineResult<DeliveryReport> {
        let candidates = TargetSelector::new(self.ctx).select(kind, source).await?;
        DeliveryExecutor::new(self.ctx)
            .deliver(source, candidates, message)
            .await
    }
}
