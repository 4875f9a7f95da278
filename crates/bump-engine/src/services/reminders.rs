//! Reminder loop
//!
//! Recurring pass over the shard-local bump reminders. Once a guild's
//! cooldown has elapsed for the reminded user, the ping goes to the stored
//! channel and the reminder is deleted; a ping that cannot be delivered
//! drops the reminder anyway. Vote lookups are memoised for one pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bump_core::cooldown::bump_cooldown;
use bump_core::{Reminder, Snowflake};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use super::context::EngineContext;
use super::error::EngineResult;
use super::notices;

/// Reminder loop
pub struct ReminderLoop {
    ctx: EngineContext,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl ReminderLoop {
    /// Create a new ReminderLoop
    pub fn new(ctx: EngineContext) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    /// Start the reminder loop.
    ///
    /// Spawns a background task that waits for the readiness gate, then
    /// drives [`Self::tick`] on the configured interval until [`Self::stop`].
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Reminder loop is already running");
            return;
        }

        let reminders = self.clone();
        tokio::spawn(async move {
            reminders.run().await;
        });

        info!("Reminder loop started");
    }

    /// Stop the reminder loop
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
        info!("Reminder loop stopped");
    }

    /// Check if the loop is running
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

        info!("Reminder loop ended");
    }

    /// Run one reminder pass over the shard-local reminders.
    ///
    /// Public so tests can drive a pass without the interval loop.
    #[instrument(skip(self))]
    pub async fn tick(&self) {
        let topology = self.ctx.topology();
        let reminders = match self.ctx.reminders().for_shard(&topology).await {
            Ok(reminders) => reminders,
            Err(err) => {
                warn!(error = %err, "Reminder pass could not load reminders");
                return;
            }
        };
        if reminders.is_empty() {
            return;
        }

        debug!(reminders = reminders.len(), "Reminder pass");
        let mut votes: HashMap<Snowflake, bool> = HashMap::new();
        let now = Utc::now();
        for reminder in reminders {
            if let Err(err) = self.process(&reminder, &mut votes, now).await {
                warn!(
                    guild_id = %reminder.guild_id,
                    user_id = %reminder.user_id,
                    error = %err,
                    "Reminder failed"
                );
            }
        }
    }

    async fn process(
        &self,
        reminder: &Reminder,
        votes: &mut HashMap<Snowflake, bool>,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let Some(guild) = self.ctx.guilds().find(reminder.guild_id).await? else {
            debug!(guild_id = %reminder.guild_id, "Guild gone, reminder skipped");
            return Ok(());
        };

        let has_voted = match votes.get(&reminder.user_id) {
            Some(voted) => *voted,
            None => {
                let voted = self.ctx.votes().has_voted(reminder.user_id).await;
                votes.insert(reminder.user_id, voted);
                voted
            }
        };
        let cooldown = bump_cooldown(&guild, false, has_voted);
        if guild.on_cooldown(cooldown, now) {
            return Ok(());
        }

        // The cooldown has elapsed: ping and drop the reminder. A failed or
        // undeliverable ping drops it too.
        let notice = notices::bump_available(&guild, reminder.user_id);
        match self
            .ctx
            .gateway()
            .resolve_channel(reminder.guild_id, reminder.channel_id)
            .await
        {
            Some(channel) => {
                if let Err(err) = self.ctx.gateway().send_notice(&channel, &notice).await {
                    debug!(
                        guild_id = %reminder.guild_id,
                        user_id = %reminder.user_id,
                        error = %err,
                        "Reminder ping failed, dropping reminder"
                    );
                }
            }
            None => {
                debug!(
                    guild_id = %reminder.guild_id,
                    channel_id = %reminder.channel_id,
                    "Reminder channel gone, dropping reminder"
                );
            }
        }
        self.ctx
            .reminders()
            .delete(reminder.guild_id, reminder.user_id)
            .await?;

        info!(
            guild_id = %reminder.guild_id,
            user_id = %reminder.user_id,
            "Reminder handled"
        );
        Ok(())
    }
}

impl Drop for ReminderLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
