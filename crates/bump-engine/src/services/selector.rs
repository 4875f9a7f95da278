//! Target selector
//!
//! Resolves a fanout policy into the shard-local candidate list. All
//! policies work over guilds owned by this shard with a configured feed,
//! outside the failure-exclusion window, and not blocked; the store's query
//! surface enforces those predicates, the selector composes them.

use bump_core::entities::distributed_share;
use bump_core::{BumpKind, Guild};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use super::context::EngineContext;
use super::error::EngineResult;
use super::settings::failed_cutoff;

/// Target selector for one shard's guild pool
pub struct TargetSelector<'a> {
    ctx: &'a EngineContext,
}

impl<'a> TargetSelector<'a> {
    /// Create a new TargetSelector
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Resolve the candidate destinations for one bump.
    ///
    /// Candidates come back filtered to the source's content-safety flag.
    /// `HUBS` additionally includes the source guild itself when this shard
    /// owns it and its feed is eligible; the sampled policies append hub
    /// guilds (de-duplicated by id) whenever the random sample comes up
    /// short of the quota.
    #[instrument(skip(self, source))]
    pub async fn select(&self, kind: BumpKind, source: &Guild) -> EngineResult<Vec<Guild>> {
        let cutoff = failed_cutoff(Utc::now());
        let topology = self.ctx.topology();

        let mut candidates = match kind {
            BumpKind::Sandbox => Vec::new(),
            BumpKind::Full => self.ctx.guilds().all_feed_guilds(&topology, cutoff).await?,
            BumpKind::Hubs => {
                let mut picked = self.ctx.guilds().hub_feed_guilds(&topology, cutoff).await?;
                if topology.is_local(source.id)
                    && source.is_valid_target(cutoff)
                    && picked.iter().all(|hub| hub.id != source.id)
                {
                    picked.push(source.clone());
                }
                picked
            }
            BumpKind::Cross => {
                let quota = self.ctx.settings().base_quota;
                self.sampled_with_hub_fallback(quota, cutoff).await?
            }
            BumpKind::Distributed => {
                let quota = distributed_share(self.ctx.settings().base_quota, topology.shard_count);
                self.sampled_with_hub_fallback(quota, cutoff).await?
            }
        };

        candidates.retain(|candidate| candidate.nsfw == source.nsfw);
        debug!(
            source_id = %source.id,
            kind = kind.as_str(),
            candidates = candidates.len(),
            "Candidates selected"
        );
        Ok(candidates)
    }

    /// Uniform random sample up to `quota`, padded with hub guilds (no
    /// further cap) when the sample alone cannot fill it.
    async fn sampled_with_hub_fallback(
        &self,
        quota: u32,
        cutoff: DateTime<Utc>,
    ) -> EngineResult<Vec<Guild>> {
        let topology = self.ctx.topology();

        let mut picked = self
            .ctx
            .guilds()
            .sample_feed_guilds(&topology, cutoff, quota)
            .await?;
        if (picked.len() as u32) < quota {
            let hubs = self.ctx.guilds().hub_feed_guilds(&topology, cutoff).await?;
            for hub in hubs {
                if picked.iter().all(|guild| guild.id != hub.id) {
                    picked.push(hub);
                }
            }
        }
        Ok(picked)
    }
}
