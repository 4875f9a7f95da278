//! Engine context - dependency container for services
//!
//! Holds every collaborator the engine talks to plus the shared engine-side
//! state (suppression map, readiness gate, topology, tuning).

use std::sync::Arc;

use bump_core::traits::{FeedGateway, GuildStore, ReminderStore, ShardTransport, VoteSource};
use bump_core::ShardTopology;

use super::error::{EngineError, EngineResult};
use super::ready::ReadyGate;
use super::settings::EngineSettings;
use super::suppress::SuppressionMap;

/// Engine context containing all dependencies
///
/// This is the dependency container passed to all services. It provides
/// access to:
/// - The persistence traits (guild and reminder stores)
/// - The platform session (feed gateway)
/// - The inter-shard transport and the vote oracle
/// - Shared engine state: suppression map, readiness gate, topology, tuning
#[derive(Clone)]
pub struct EngineContext {
    // Collaborators
    guilds: Arc<dyn GuildStore>,
    reminders: Arc<dyn ReminderStore>,
    gateway: Arc<dyn FeedGateway>,
    transport: Arc<dyn ShardTransport>,
    votes: Arc<dyn VoteSource>,

    // Shared engine state
    suppression: Arc<SuppressionMap>,
    ready: Arc<ReadyGate>,
    topology: ShardTopology,
    settings: EngineSettings,
}

impl EngineContext {
    /// Create a new engine context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        guilds: Arc<dyn GuildStore>,
        reminders: Arc<dyn ReminderStore>,
        gateway: Arc<dyn FeedGateway>,
        transport: Arc<dyn ShardTransport>,
        votes: Arc<dyn VoteSource>,
        suppression: Arc<SuppressionMap>,
        ready: Arc<ReadyGate>,
        topology: ShardTopology,
        settings: EngineSettings,
    ) -> Self {
        Self {
            guilds,
            reminders,
            gateway,
            transport,
            votes,
            suppression,
            ready,
            topology,
            settings,
        }
    }

    // === Collaborators ===

    /// Get the guild store
    pub fn guilds(&self) -> &dyn GuildStore {
        self.guilds.as_ref()
    }

    /// Get the reminder store
    pub fn reminders(&self) -> &dyn ReminderStore {
        self.reminders.as_ref()
    }

    /// Get the platform session
    pub fn gateway(&self) -> &dyn FeedGateway {
        self.gateway.as_ref()
    }

    /// Get the inter-shard transport
    pub fn transport(&self) -> &dyn ShardTransport {
        self.transport.as_ref()
    }

    /// Get the vote-status oracle
    pub fn votes(&self) -> &dyn VoteSource {
        self.votes.as_ref()
    }

    // === Shared state ===

    /// Get the owner-notification suppression map
    pub fn suppression(&self) -> &SuppressionMap {
        self.suppression.as_ref()
    }

    /// Get the readiness gate
    pub fn ready(&self) -> &ReadyGate {
        self.ready.as_ref()
    }

    /// Get this process's position in the shard federation
    pub fn topology(&self) -> ShardTopology {
        self.topology
    }

    /// Get the engine tuning values
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("topology", &self.topology)
            .field("settings", &self.settings)
            .field("collaborators", &"...")
            .finish()
    }
}

/// Builder for creating an EngineContext
///
/// The five collaborators and the topology are required; tuning defaults to
/// [`EngineSettings::default`], and the suppression map and readiness gate
/// are created from those settings when not injected explicitly.
pub struct EngineContextBuilder {
    guilds: Option<Arc<dyn GuildStore>>,
    reminders: Option<Arc<dyn ReminderStore>>,
    gateway: Option<Arc<dyn FeedGateway>>,
    transport: Option<Arc<dyn ShardTransport>>,
    votes: Option<Arc<dyn VoteSource>>,
    suppression: Option<Arc<SuppressionMap>>,
    ready: Option<Arc<ReadyGate>>,
    topology: Option<ShardTopology>,
    settings: Option<EngineSettings>,
}

impl EngineContextBuilder {
    pub fn new() -> Self {
        Self {
            guilds: None,
            reminders: None,
            gateway: None,
            transport: None,
            votes: None,
            suppression: None,
            ready: None,
            topology: None,
            settings: None,
        }
    }

    pub fn guilds(mut self, store: Arc<dyn GuildStore>) -> Self {
        self.guilds = Some(store);
        self
    }

    pub fn reminders(mut self, store: Arc<dyn ReminderStore>) -> Self {
        self.reminders = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn FeedGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn ShardTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn votes(mut self, votes: Arc<dyn VoteSource>) -> Self {
        self.votes = Some(votes);
        self
    }

    pub fn suppression(mut self, suppression: Arc<SuppressionMap>) -> Self {
        self.suppression = Some(suppression);
        self
    }

    pub fn ready(mut self, ready: Arc<ReadyGate>) -> Self {
        self.ready = Some(ready);
        self
    }

    pub fn topology(mut self, topology: ShardTopology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the EngineContext
    ///
    /// # Errors
    /// Returns `EngineError::Configuration` if a required dependency is
    /// missing.
    pub fn build(self) -> EngineResult<EngineContext> {
        let settings = self.settings.unwrap_or_default();
        let suppression = self
            .suppression
            .unwrap_or_else(|| Arc::new(SuppressionMap::new(settings.suppression_ttl)));
        let ready = self.ready.unwrap_or_else(|| Arc::new(ReadyGate::new()));

        Ok(EngineContext::new(
            self.guilds
                .ok_or_else(|| EngineError::configuration("guild store is required"))?,
            self.reminders
                .ok_or_else(|| EngineError::configuration("reminder store is required"))?,
            self.gateway
                .ok_or_else(|| EngineError::configuration("feed gateway is required"))?,
            self.transport
                .ok_or_else(|| EngineError::configuration("shard transport is required"))?,
            self.votes
                .ok_or_else(|| EngineError::configuration("vote source is required"))?,
            suppression,
            ready,
            self.topology
                .ok_or_else(|| EngineError::configuration("shard topology is required"))?,
            settings,
        ))
    }
}

impl Default for EngineContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
