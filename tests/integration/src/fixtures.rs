//! Test fixtures and in-memory fakes
//!
//! One fake per collaborator trait, scriptable from tests, plus a guild
//! builder and an [`EngineFixture`] that wires a full engine context
//! together. Ids come from an atomic counter shifted into the timestamp
//! bits so the partition formula sees clean values.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bump_core::traits::{
    ChannelInfo, FanoutHandler, FanoutRequest, FeedGateway, GatewayError, GuildStore,
    ReminderStore, RoleOverwrite, ShardReply, ShardTransport, StoreResult, VoteSource,
};
use bump_core::{
    BumpMessage, DomainError, Feature, Guild, Notice, Permissions, Reminder, ShardTopology,
    Snowflake,
};
use bump_engine::{EngineContext, EngineContextBuilder, EngineSettings, ReadyGate};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Counter for unique test ids
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// A fresh snowflake owned by the given shard in a federation of
/// `shard_count` workers
pub fn id_owned_by(shard: u32, shard_count: u32) -> Snowflake {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    Snowflake::new((n * i64::from(shard_count.max(1)) + i64::from(shard)) << 22)
}

/// A fresh snowflake (owned by shard 0 of any topology)
pub fn unique_id() -> Snowflake {
    id_owned_by(0, 1)
}

// ============================================================================
// Guild builder
// ============================================================================

/// Builder for guild records in tests
pub struct GuildBuilder {
    guild: Guild,
}

impl GuildBuilder {
    /// A guild owned by shard 0
    pub fn new() -> Self {
        Self::on_shard(0, 1)
    }

    /// A guild owned by the given shard
    pub fn on_shard(shard: u32, shard_count: u32) -> Self {
        let id = id_owned_by(shard, shard_count);
        Self {
            guild: Guild::new(id, format!("guild-{id}")),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.guild.name = name.into();
        self
    }

    /// Give the guild a fresh feed channel
    pub fn feed(mut self) -> Self {
        self.guild.feed = Some(unique_id());
        self
    }

    pub fn feed_channel(mut self, channel: Snowflake) -> Self {
        self.guild.feed = Some(channel);
        self
    }

    /// Fill in the content a guild needs before it may bump
    pub fn ready_to_bump(mut self) -> Self {
        self.guild.description = Some("come hang out".to_string());
        self.guild.invite = Some("inv123".to_string());
        self
    }

    pub fn hub(mut self) -> Self {
        self.guild.hub = true;
        self
    }

    pub fn sandbox(mut self) -> Self {
        self.guild.sandbox = true;
        self
    }

    pub fn nsfw(mut self) -> Self {
        self.guild.nsfw = true;
        self
    }

    pub fn blocked(mut self, reason: impl Into<String>) -> Self {
        self.guild.blocked = Some(reason.into());
        self
    }

    pub fn features(mut self, features: Vec<Feature>) -> Self {
        self.guild.features = features;
        self
    }

    pub fn tier_features(mut self, features: Vec<Feature>) -> Self {
        self.guild.tier_features = features;
        self
    }

    /// Switch autobump on (the capability is granted separately)
    pub fn autobump(mut self) -> Self {
        self.guild.autobump = true;
        self
    }

    pub fn autobump_notifications(mut self, channel: Snowflake) -> Self {
        self.guild.autobump_notifications = Some(channel);
        self
    }

    pub fn last_bumped_at(mut self, at: DateTime<Utc>) -> Self {
        self.guild.last_bumped_at = Some(at);
        self
    }

    pub fn last_failed_at(mut self, at: DateTime<Utc>) -> Self {
        self.guild.last_failed_at = Some(at);
        self
    }

    pub fn build(self) -> Guild {
        self.guild
    }
}

impl Default for GuildBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Memory guild store
// ============================================================================

/// In-memory [`GuildStore`] mirroring the SQL predicates of the real store
#[derive(Default)]
pub struct MemoryGuildStore {
    guilds: Mutex<HashMap<Snowflake, Guild>>,
}

impl MemoryGuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, guild: Guild) {
        self.guilds.lock().insert(guild.id, guild);
    }

    /// Current record, for assertions
    pub fn get(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.guilds.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guilds.lock().is_empty()
    }
}

#[async_trait]
impl GuildStore for MemoryGuildStore {
    async fn find(&self, id: Snowflake) -> StoreResult<Option<Guild>> {
        Ok(self.guilds.lock().get(&id).cloned())
    }

    async fn upsert(&self, id: Snowflake, name: &str) -> StoreResult<Guild> {
        let mut guilds = self.guilds.lock();
        let guild = guilds
            .entry(id)
            .and_modify(|existing| {
                existing.name = name.to_string();
                existing.updated_at = Utc::now();
            })
            .or_insert_with(|| Guild::new(id, name.to_string()));
        Ok(guild.clone())
    }

    async fn save(&self, guild: &Guild) -> StoreResult<()> {
        let mut guilds = self.guilds.lock();
        if !guilds.contains_key(&guild.id) {
            return Err(DomainError::GuildNotFound(guild.id));
        }
        guilds.insert(guild.id, guild.clone());
        Ok(())
    }

    async fn sample_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Guild>> {
        let mut eligible: Vec<Guild> = self
            .guilds
            .lock()
            .values()
            .filter(|g| topology.is_local(g.id) && !g.hub && g.is_valid_target(failed_cutoff))
            .cloned()
            .collect();
        eligible.shuffle(&mut thread_rng());
        eligible.truncate(limit as usize);
        Ok(eligible)
    }

    async fn all_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>> {
        let mut eligible: Vec<Guild> = self
            .guilds
            .lock()
            .values()
            .filter(|g| topology.is_local(g.id) && g.is_valid_target(failed_cutoff))
            .cloned()
            .collect();
        eligible.sort_by_key(|g| g.id);
        Ok(eligible)
    }

    async fn hub_feed_guilds(
        &self,
        topology: &ShardTopology,
        failed_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<Guild>> {
        let mut eligible: Vec<Guild> = self
            .guilds
            .lock()
            .values()
            .filter(|g| topology.is_local(g.id) && g.hub && g.is_valid_target(failed_cutoff))
            .cloned()
            .collect();
        eligible.sort_by_key(|g| g.id);
        Ok(eligible)
    }

    async fn autobump_guilds(&self, topology: &ShardTopology) -> StoreResult<Vec<Guild>> {
        let mut eligible: Vec<Guild> = self
            .guilds
            .lock()
            .values()
            .filter(|g| topology.is_local(g.id) && g.autobump && g.blocked.is_none())
            .cloned()
            .collect();
        eligible.sort_by_key(|g| g.id);
        Ok(eligible)
    }
}

// ============================================================================
// Memory reminder store
// ============================================================================

/// In-memory [`ReminderStore`] keyed by (guild, user)
#[derive(Default)]
pub struct MemoryReminderStore {
    reminders: Mutex<HashMap<(Snowflake, Snowflake), Reminder>>,
}

impl MemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reminder: Reminder) {
        self.reminders
            .lock()
            .insert((reminder.guild_id, reminder.user_id), reminder);
    }

    pub fn contains(&self, guild_id: Snowflake, user_id: Snowflake) -> bool {
        self.reminders.lock().contains_key(&(guild_id, user_id))
    }

    pub fn len(&self) -> usize {
        self.reminders.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.lock().is_empty()
    }
}

#[async_trait]
impl ReminderStore for MemoryReminderStore {
    async fn for_shard(&self, topology: &ShardTopology) -> StoreResult<Vec<Reminder>> {
        let mut owned: Vec<Reminder> = self
            .reminders
            .lock()
            .values()
            .filter(|r| topology.is_local(r.guild_id))
            .cloned()
            .collect();
        owned.sort_by_key(|r| r.created_at);
        Ok(owned)
    }

    async fn put(&self, reminder: &Reminder) -> StoreResult<()> {
        self.insert(reminder.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> StoreResult<()> {
        self.reminders.lock().remove(&(guild_id, user_id));
        Ok(())
    }
}

// ============================================================================
// Test gateway
// ============================================================================

/// Scriptable [`FeedGateway`] recording everything it sends
pub struct TestGateway {
    bot_id: Snowflake,
    live: Mutex<HashSet<Snowflake>>,
    channels: Mutex<HashMap<Snowflake, ChannelInfo>>,
    permissions: Mutex<HashMap<Snowflake, Permissions>>,
    overwrites: Mutex<HashMap<Snowflake, Vec<RoleOverwrite>>>,
    owners: Mutex<HashMap<Snowflake, Snowflake>>,
    refused_channels: Mutex<HashSet<Snowflake>>,
    sent_bumps: Mutex<Vec<(Snowflake, BumpMessage)>>,
    sent_notices: Mutex<Vec<(Snowflake, Notice)>>,
    sent_directs: Mutex<Vec<(Snowflake, Notice)>>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self {
            bot_id: unique_id(),
            live: Mutex::new(HashSet::new()),
            channels: Mutex::new(HashMap::new()),
            permissions: Mutex::new(HashMap::new()),
            overwrites: Mutex::new(HashMap::new()),
            owners: Mutex::new(HashMap::new()),
            refused_channels: Mutex::new(HashSet::new()),
            sent_bumps: Mutex::new(Vec::new()),
            sent_notices: Mutex::new(Vec::new()),
            sent_directs: Mutex::new(Vec::new()),
        }
    }

    /// Bring a guild's session up. Its feed and notification channels (when
    /// configured) resolve with default delivery permissions, and the feed's
    /// nsfw marking matches the guild's flag.
    pub fn connect(&self, guild: &Guild) {
        self.live.lock().insert(guild.id);
        if let Some(feed) = guild.feed {
            self.add_channel(guild.id, feed, guild.nsfw);
        }
        if let Some(channel) = guild.autobump_notifications {
            self.add_channel(guild.id, channel, false);
        }
    }

    /// Bring a session up without resolving any channels
    pub fn connect_bare(&self, guild_id: Snowflake) {
        self.live.lock().insert(guild_id);
    }

    pub fn add_channel(&self, guild_id: Snowflake, channel_id: Snowflake, nsfw: bool) {
        self.channels.lock().insert(
            channel_id,
            ChannelInfo {
                id: channel_id,
                guild_id,
                nsfw,
            },
        );
    }

    pub fn remove_channel(&self, channel_id: Snowflake) {
        self.channels.lock().remove(&channel_id);
    }

    pub fn set_permissions(&self, channel_id: Snowflake, permissions: Permissions) {
        self.permissions.lock().insert(channel_id, permissions);
    }

    pub fn set_overwrites(&self, channel_id: Snowflake, overwrites: Vec<RoleOverwrite>) {
        self.overwrites.lock().insert(channel_id, overwrites);
    }

    pub fn set_owner(&self, guild_id: Snowflake, user_id: Snowflake) {
        self.owners.lock().insert(guild_id, user_id);
    }

    /// Make every send into this channel fail with a refusal
    pub fn refuse_sends(&self, channel_id: Snowflake) {
        self.refused_channels.lock().insert(channel_id);
    }

    pub fn bumps_to(&self, channel_id: Snowflake) -> usize {
        self.sent_bumps
            .lock()
            .iter()
            .filter(|(channel, _)| *channel == channel_id)
            .count()
    }

    pub fn total_bumps_sent(&self) -> usize {
        self.sent_bumps.lock().len()
    }

    pub fn notices_to(&self, channel_id: Snowflake) -> Vec<Notice> {
        self.sent_notices
            .lock()
            .iter()
            .filter(|(channel, _)| *channel == channel_id)
            .map(|(_, notice)| notice.clone())
            .collect()
    }

    pub fn directs_to(&self, user_id: Snowflake) -> Vec<Notice> {
        self.sent_directs
            .lock()
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, notice)| notice.clone())
            .collect()
    }
}

impl Default for TestGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedGateway for TestGateway {
    async fn has_guild(&self, guild_id: Snowflake) -> bool {
        self.live.lock().contains(&guild_id)
    }

    async fn resolve_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> Option<ChannelInfo> {
        self.channels
            .lock()
            .get(&channel_id)
            .filter(|channel| channel.guild_id == guild_id)
            .cloned()
    }

    async fn bot_permissions(&self, channel: &ChannelInfo) -> Permissions {
        self.permissions
            .lock()
            .get(&channel.id)
            .copied()
            .unwrap_or(Permissions::FEED_DELIVERY)
    }

    async fn role_overwrites(&self, channel: &ChannelInfo) -> Vec<RoleOverwrite> {
        self.overwrites
            .lock()
            .get(&channel.id)
            .cloned()
            .unwrap_or_default()
    }

    async fn guild_owner(&self, guild_id: Snowflake) -> Option<Snowflake> {
        self.owners.lock().get(&guild_id).copied()
    }

    fn bot_user_id(&self) -> Snowflake {
        self.bot_id
    }

    async fn send_bump(
        &self,
        channel: &ChannelInfo,
        message: &BumpMessage,
    ) -> Result<(), GatewayError> {
        if self.refused_channels.lock().contains(&channel.id) {
            return Err(GatewayError::Refused("scripted refusal".to_string()));
        }
        self.sent_bumps.lock().push((channel.id, message.clone()));
        Ok(())
    }

    async fn send_notice(&self, channel: &ChannelInfo, notice: &Notice) -> Result<(), GatewayError> {
        if self.refused_channels.lock().contains(&channel.id) {
            return Err(GatewayError::Refused("scripted refusal".to_string()));
        }
        self.sent_notices.lock().push((channel.id, notice.clone()));
        Ok(())
    }

    async fn send_direct(&self, user_id: Snowflake, notice: &Notice) -> Result<(), GatewayError> {
        self.sent_directs.lock().push((user_id, notice.clone()));
        Ok(())
    }
}

// ============================================================================
// Transports
// ============================================================================

/// [`ShardTransport`] answering every broadcast with a scripted reply set
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<Vec<ShardReply>>,
    requests: Mutex<Vec<FanoutRequest>>,
}

impl StubTransport {
    /// A transport with no siblings
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply set every later broadcast receives
    pub fn script_replies(&self, replies: Vec<ShardReply>) {
        *self.replies.lock() = replies;
    }

    /// Every request broadcast so far
    pub fn requests(&self) -> Vec<FanoutRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ShardTransport for StubTransport {
    async fn broadcast(&self, request: &FanoutRequest) -> Vec<ShardReply> {
        self.requests.lock().push(request.clone());
        self.replies.lock().clone()
    }
}

/// [`ShardTransport`] that serves each sibling in-process through its
/// [`FanoutHandler`], for end-to-end coordination tests without a wire
pub struct InProcessTransport {
    handlers: Vec<(u32, Arc<dyn FanoutHandler>)>,
    requests: Mutex<Vec<FanoutRequest>>,
}

impl InProcessTransport {
    pub fn new(handlers: Vec<(u32, Arc<dyn FanoutHandler>)>) -> Self {
        Self {
            handlers,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FanoutRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ShardTransport for InProcessTransport {
    async fn broadcast(&self, request: &FanoutRequest) -> Vec<ShardReply> {
        self.requests.lock().push(request.clone());
        let mut replies = Vec::with_capacity(self.handlers.len());
        for (shard_id, handler) in &self.handlers {
            let reached = handler.handle_fanout(request).await;
            replies.push(ShardReply {
                shard_id: *shard_id,
                reached: Some(reached),
            });
        }
        replies
    }
}

// ============================================================================
// Vote oracle
// ============================================================================

/// [`VoteSource`] with a fixed voter set, counting lookups
#[derive(Default)]
pub struct StaticVotes {
    voters: Mutex<HashSet<Snowflake>>,
    lookups: AtomicU64,
}

impl StaticVotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_voter(&self, user_id: Snowflake) {
        self.voters.lock().insert(user_id);
    }

    /// How many times the oracle was consulted
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoteSource for StaticVotes {
    async fn has_voted(&self, user_id: Snowflake) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.voters.lock().contains(&user_id)
    }
}

// ============================================================================
// Engine fixture
// ============================================================================

/// A fully wired engine context over the in-memory fakes
pub struct EngineFixture {
    pub guilds: Arc<MemoryGuildStore>,
    pub reminders: Arc<MemoryReminderStore>,
    pub gateway: Arc<TestGateway>,
    pub transport: Arc<StubTransport>,
    pub votes: Arc<StaticVotes>,
    pub ready: Arc<ReadyGate>,
    pub ctx: EngineContext,
}

impl EngineFixture {
    /// Single-shard fixture, gate already released
    pub fn standalone() -> Self {
        Self::with_settings(ShardTopology::standalone(), Self::test_settings())
    }

    /// Single-shard fixture with the readiness gate still closed
    pub fn standalone_not_ready() -> Self {
        Self::build(ShardTopology::standalone(), Self::test_settings())
    }

    /// Multi-shard fixture, gate already released
    pub fn sharded(shard_id: u32, shard_count: u32) -> Self {
        Self::with_settings(
            ShardTopology::new(shard_id, shard_count),
            Self::test_settings(),
        )
    }

    /// Fixture with custom tuning, gate already released
    pub fn with_settings(topology: ShardTopology, settings: EngineSettings) -> Self {
        let fixture = Self::build(topology, settings);
        fixture.ready.mark_ready();
        fixture
    }

    /// Tuning with intervals small enough for tests
    pub fn test_settings() -> EngineSettings {
        EngineSettings {
            base_quota: 50,
            tick_interval: Duration::from_millis(20),
            suppression_ttl: Duration::from_secs(30),
            sandbox_settle: Duration::from_millis(10),
        }
    }

    fn build(topology: ShardTopology, settings: EngineSettings) -> Self {
        let guilds = Arc::new(MemoryGuildStore::new());
        let reminders = Arc::new(MemoryReminderStore::new());
        let gateway = Arc::new(TestGateway::new());
        let transport = Arc::new(StubTransport::new());
        let votes = Arc::new(StaticVotes::new());
        let ready = Arc::new(ReadyGate::new());

        let ctx = EngineContextBuilder::new()
            .guilds(guilds.clone())
            .reminders(reminders.clone())
            .gateway(gateway.clone())
            .transport(transport.clone())
            .votes(votes.clone())
            .ready(ready.clone())
            .topology(topology)
            .settings(settings)
            .build()
            .expect("fixture context must build");

        Self {
            guilds,
            reminders,
            gateway,
            transport,
            votes,
            ready,
            ctx,
        }
    }

    /// Store the guild and bring its session up
    pub fn seed_connected(&self, guild: Guild) -> Guild {
        self.gateway.connect(&guild);
        self.guilds.insert(guild.clone());
        guild
    }

    /// Store the guild without a live session
    pub fn seed_offline(&self, guild: Guild) -> Guild {
        self.guilds.insert(guild.clone());
        guild
    }
}
