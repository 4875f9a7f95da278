//! Autobump scheduler
//!
//! Recurring pass over the shard-local guilds with autobump switched on.
//! Each eligible guild gets a full coordinated bump under the automated
//! actor; one guild's failure never stops the pass. Ticks run strictly one
//! at a time: the loop awaits tick completion before sleeping again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bump_core::cooldown::bump_cooldown;
use bump_core::{BumpMessage, Feature, Guild};
use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::context::EngineContext;
use super::coordinator::BumpCoordinator;
use super::delivery::DeliveryExecutor;
use super::error::{EngineError, EngineResult};
use super::notices;

/// Autobump scheduler
pub struct AutobumpScheduler {
    ctx: EngineContext,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl AutobumpScheduler {
    /// Create a new AutobumpScheduler
    pub fn new(ctx: EngineContext) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    /// Start the scheduler loop.
    ///
    /// Spawns a background task that waits for the readiness gate, then
    /// drives [`Self::tick`] on the configured interval until [`Self::stop`].
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Autobump scheduler is already running");
            return;
        }

        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.run().await;
        });

        info!("Autobump scheduler started");
    }

    /// Stop the scheduler loop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
        info!("Autobump scheduler stopped");
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self) {
        let mut shutdown = self.shutdown.subscribe();

        tokio::select! {
            () = self.ctx.ready().wait_ready() => {}
            _ = shutdown.changed() => {}
        }

        let mut ticker = tokio::time::interval(self.ctx.settings().tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.running.load(Ordering::SeqCst) {
                        self.tick().await;
                    }
                }
                _ = shutdown.changed() => {}
            }
        }

        info!("Autobump loop ended");
    }

    /// Run one autobump pass over the shard-local autobump guilds.
    ///
    /// Public so tests (and operational tooling) can drive a pass without
    /// the interval loop.
    #[instrument(skip(self))]
    pub async fn tick(&self) {
        let topology = self.ctx.topology();
        let guilds = match self.ctx.guilds().autobump_guilds(&topology).await {
            Ok(guilds) => guilds,
            Err(err) => {
                warn!(error = %err, "Autobump pass could not load guilds");
                return;
            }
        };
        if guilds.is_empty() {
            return;
        }

        debug!(guilds = guilds.len(), "Autobump pass");
        for mut guild in guilds {
            if let Err(err) = self.process(&mut guild).await {
                warn!(guild_id = %guild.id, error = %err, "Autobump failed for guild");
            }
        }
    }

    /// Drive one guild through an automatic bump.
    ///
    /// Skips are silent (cooldown running, session gap); a revoked
    /// capability deactivates autobump for good. The bump itself runs
    /// through the coordinator, and its result is mirrored into the guild's
    /// status channel either way.
    async fn process(&self, guild: &mut Guild) -> EngineResult<()> {
        if !guild.has_capability(Feature::Autobump) {
            guild.disable_autobump();
            self.ctx.guilds().save(guild).await?;
            info!(guild_id = %guild.id, "Autobump capability revoked, deactivated");
            return Ok(());
        }

        let cooldown = bump_cooldown(guild, true, false);
        if guild.on_cooldown(cooldown, Utc::now()) {
            return Ok(());
        }

        if !self.ctx.gateway().has_guild(guild.id).await {
            debug!(guild_id = %guild.id, "Session gap, autobump deferred");
            return Ok(());
        }

        let actor = self.ctx.gateway().bot_user_id();
        let result = match BumpMessage::compose(guild) {
            Ok(message) => {
                BumpCoordinator::new(&self.ctx)
                    .bump(guild, &message, actor)
                    .await
            }
            Err(err) => Err(EngineError::from(err)),
        };

        let executor = DeliveryExecutor::new(&self.ctx);
        match result {
            Ok(summary) => {
                info!(
                    guild_id = %guild.id,
                    reached_locally = summary.reached_locally.len(),
                    external = summary.external_count,
                    "Autobump delivered"
                );
                let notice = notices::autobump_delivered(
                    guild,
                    summary.reached_locally.len(),
                    summary.external_count,
                );
                executor.post_status(guild, &notice).await
            }
            Err(err) => {
                warn!(guild_id = %guild.id, error = %err, "Autobump attempt failed");
                let notice = notices::autobump_failed(guild, &err);
                executor.post_status(guild, &notice).await
            }
        }
    }
}

impl Drop for AutobumpScheduler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
