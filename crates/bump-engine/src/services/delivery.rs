//! Delivery executor
//!
//! Walks a candidate list, lands the rendered message in each feed channel
//! it can, and runs remediation for the ones it cannot: session gaps put the
//! candidate into the failure-exclusion window, broken channel configuration
//! disables the channel and notifies the owner (suppressed, best-effort).
//! Only storage faults abort the batch.

use bump_core::entities::DeliveryReport;
use bump_core::issues::{feed_channel_issues, notice_channel_issues};
use bump_core::{BumpMessage, DeliveryOutcome, Guild, Notice};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use super::context::EngineContext;
use super::error::EngineResult;
use super::notices;
use super::settings::failed_cutoff;

/// Delivery executor for one shard-local fanout
pub struct DeliveryExecutor<'a> {
    ctx: &'a EngineContext,
}

impl<'a> DeliveryExecutor<'a> {
    /// Create a new DeliveryExecutor
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Deliver the message to every candidate, in order.
    ///
    /// Per-candidate failures are classified and absorbed; the report lists
    /// the guilds actually reached plus every candidate's outcome. Storage
    /// errors while persisting remediation propagate as hard faults.
    #[instrument(skip(self, source, candidates, message))]
    pub async fn deliver(
        &self,
        source: &Guild,
        candidates: Vec<Guild>,
        message: &BumpMessage,
    ) -> EngineResult<DeliveryReport> {
        let cutoff = failed_cutoff(Utc::now());
        let mut report = DeliveryReport::default();

        debug!(
            source_id = %source.id,
            candidates = candidates.len(),
            "Delivering bump"
        );

        for mut candidate in candidates {
            let outcome = self
                .deliver_one(source, &mut candidate, message, cutoff)
                .await?;
            let delivered = outcome.is_delivered();
            report.outcomes.push((candidate.id, outcome));
            if delivered {
                report.reached.push(candidate);
            }
        }

        debug!(
            source_id = %source.id,
            reached = report.reached_count(),
            "Delivery pass finished"
        );
        Ok(report)
    }

    /// Post a status notice into the guild's autobump notification channel.
    ///
    /// The channel is checked with the bot-permission subset only. A missing
    /// or broken channel clears `autobump_notifications` (persisted) and
    /// notifies the owner under the suppression window; an unknown send
    /// failure is just logged.
    #[instrument(skip(self, guild, notice))]
    pub async fn post_status(&self, guild: &mut Guild, notice: &Notice) -> EngineResult<()> {
        let Some(channel_id) = guild.autobump_notifications else {
            return Ok(());
        };

        let Some(channel) = self
            .ctx
            .gateway()
            .resolve_channel(guild.id, channel_id)
            .await
        else {
            guild.clear_autobump_notifications();
            self.ctx.guilds().save(guild).await?;
            self.notify_owner(guild, notices::status_channel_missing(guild))
                .await;
            return Ok(());
        };

        let permissions = self.ctx.gateway().bot_permissions(&channel).await;
        let issues = notice_channel_issues(permissions);
        if !issues.is_empty() {
            guild.clear_autobump_notifications();
            self.ctx.guilds().save(guild).await?;
            self.notify_owner(guild, notices::status_channel_broken(guild, &issues))
                .await;
            return Ok(());
        }

        if let Err(err) = self.ctx.gateway().send_notice(&channel, notice).await {
            warn!(guild_id = %guild.id, error = %err, "Status notice failed");
        }
        Ok(())
    }

    async fn deliver_one(
        &self,
        source: &Guild,
        candidate: &mut Guild,
        message: &BumpMessage,
        cutoff: DateTime<Utc>,
    ) -> EngineResult<DeliveryOutcome> {
        if candidate.nsfw != source.nsfw {
            return Ok(DeliveryOutcome::SkippedContentMismatch);
        }
        if !candidate.is_valid_target(cutoff) {
            return Ok(DeliveryOutcome::SkippedExcluded);
        }
        let Some(feed) = candidate.feed else {
            return Ok(DeliveryOutcome::SkippedExcluded);
        };

        // No live session for this guild right now: self-exclude for the
        // window, nobody gets notified.
        if !self.ctx.gateway().has_guild(candidate.id).await {
            candidate.mark_unreachable(Utc::now());
            self.ctx.guilds().save(candidate).await?;
            debug!(guild_id = %candidate.id, "Session gap, candidate excluded");
            return Ok(DeliveryOutcome::SkippedExcluded);
        }

        let Some(channel) = self.ctx.gateway().resolve_channel(candidate.id, feed).await else {
            candidate.clear_feed();
            self.ctx.guilds().save(candidate).await?;
            self.notify_owner(candidate, notices::feed_missing(candidate))
                .await;
            return Ok(DeliveryOutcome::FailedNotFound);
        };

        let permissions = self.ctx.gateway().bot_permissions(&channel).await;
        let overwrites = self.ctx.gateway().role_overwrites(&channel).await;
        let issues = feed_channel_issues(&channel, permissions, &overwrites, candidate);
        if !issues.is_empty() {
            candidate.clear_feed();
            self.ctx.guilds().save(candidate).await?;
            self.notify_owner(candidate, notices::feed_broken(candidate, &issues))
                .await;
            return Ok(DeliveryOutcome::FailedPermission(issues));
        }

        match self.ctx.gateway().send_bump(&channel, message).await {
            Ok(()) => Ok(DeliveryOutcome::Delivered),
            Err(err) => {
                warn!(guild_id = %candidate.id, error = %err, "Bump send failed");
                Ok(DeliveryOutcome::FailedUnknown)
            }
        }
    }

    /// Best-effort private notice to the guild owner, gated by the
    /// suppression window. Failure to find or reach the owner is swallowed.
    async fn notify_owner(&self, guild: &Guild, notice: Notice) {
        if !self.ctx.suppression().claim(guild.id) {
            debug!(guild_id = %guild.id, "Owner notification suppressed");
            return;
        }
        let Some(owner) = self.ctx.gateway().guild_owner(guild.id).await else {
            debug!(guild_id = %guild.id, "Owner unknown, notification skipped");
            return;
        };
        if let Err(err) = self.ctx.gateway().send_direct(owner, &notice).await {
            debug!(guild_id = %guild.id, error = %err, "Owner notification failed");
        }
    }
}
