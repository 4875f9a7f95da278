//! Guild entity - one advertised community in the bump federation

use chrono::{DateTime, Duration, Utc};

use crate::entities::Feature;
use crate::value_objects::Snowflake;

/// Guild record
///
/// Owned by the persistence layer; the engine loads it at the start of a
/// coordination cycle, mutates it through the methods below, and saves it
/// back. Never cached across cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    /// Destination channel for incoming bumps; `None` disables the guild as
    /// a delivery target
    pub feed: Option<Snowflake>,
    /// Promotional text shown in the bump message
    pub description: Option<String>,
    /// Invite code appended to the bump message
    pub invite: Option<String>,
    /// Embed colour, honoured only with [`Feature::Color`]
    pub color: Option<i32>,
    /// Banner image URL, honoured only with [`Feature::Banner`]
    pub banner: Option<String>,
    /// Content-safety flag; bumps only travel between guilds with equal flags
    pub nsfw: bool,
    /// Hub guilds are always-eligible fallback destinations
    pub hub: bool,
    /// Sandbox guilds run no-op test bumps
    pub sandbox: bool,
    /// Directly granted capability tags
    pub features: Vec<Feature>,
    /// Capability tags inherited from assigned premium tiers
    pub tier_features: Vec<Feature>,
    pub autobump: bool,
    /// Channel receiving autobump status messages, if configured
    pub autobump_notifications: Option<Snowflake>,
    pub last_bumped_at: Option<DateTime<Utc>>,
    pub last_bumped_by: Option<Snowflake>,
    /// Set when the owning shard could not reach the guild; excludes it from
    /// candidate pools for the exclusion window
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Block reason; a blocked guild neither bumps nor receives
    pub blocked: Option<String>,
    pub total_bumps: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guild {
    /// Create a fresh record for a newly observed guild
    pub fn new(id: Snowflake, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            feed: None,
            description: None,
            invite: None,
            color: None,
            banner: None,
            nsfw: false,
            hub: false,
            sandbox: false,
            features: Vec::new(),
            tier_features: Vec::new(),
            autobump: false,
            autobump_notifications: None,
            last_bumped_at: None,
            last_bumped_by: None,
            last_failed_at: None,
            blocked: None,
            total_bumps: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Union of directly granted and tier-inherited capabilities, in grant
    /// order with duplicates removed. Computed at read time, never cached.
    pub fn capabilities(&self) -> Vec<Feature> {
        let mut result = Vec::with_capacity(self.features.len() + self.tier_features.len());
        for feature in self.features.iter().chain(self.tier_features.iter()) {
            if !result.contains(feature) {
                result.push(*feature);
            }
        }
        result
    }

    /// Whether the guild holds a capability, directly or via a tier
    pub fn has_capability(&self, feature: Feature) -> bool {
        self.features.contains(&feature) || self.tier_features.contains(&feature)
    }

    /// Whether this guild is currently a valid delivery target: feed channel
    /// configured, not blocked, and `last_failed_at` unset or at/before the
    /// exclusion cutoff
    pub fn is_valid_target(&self, failed_cutoff: DateTime<Utc>) -> bool {
        self.feed.is_some()
            && self.blocked.is_none()
            && self.last_failed_at.is_none_or(|at| at <= failed_cutoff)
    }

    /// Record a completed bump by the given actor
    pub fn record_bump(&mut self, actor: Snowflake, at: DateTime<Utc>) {
        self.last_bumped_at = Some(at);
        self.last_bumped_by = Some(actor);
        self.total_bumps += 1;
        self.updated_at = at;
    }

    /// Mark the guild temporarily unreachable from its owning shard
    pub fn mark_unreachable(&mut self, at: DateTime<Utc>) {
        self.last_failed_at = Some(at);
        self.updated_at = at;
    }

    /// Disable the feed channel (broken configuration remediation)
    pub fn clear_feed(&mut self) {
        self.feed = None;
        self.updated_at = Utc::now();
    }

    /// Drop the autobump status channel (broken configuration remediation)
    pub fn clear_autobump_notifications(&mut self) {
        self.autobump_notifications = None;
        self.updated_at = Utc::now();
    }

    /// Turn off automatic bumping (capability revoked)
    pub fn disable_autobump(&mut self) {
        self.autobump = false;
        self.updated_at = Utc::now();
    }

    /// When the next bump becomes available given a cooldown, or `None` if
    /// the guild never bumped
    pub fn next_bump_at(&self, cooldown: Duration) -> Option<DateTime<Utc>> {
        self.last_bumped_at.map(|at| at + cooldown)
    }

    /// Whether the cooldown is still running at `now`
    pub fn on_cooldown(&self, cooldown: Duration, now: DateTime<Utc>) -> bool {
        self.next_bump_at(cooldown).is_some_and(|next| next > now)
    }
}
