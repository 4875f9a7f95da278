//! Notification suppression
//!
//! A bounded, time-indexed claim map keyed by guild id. Whoever claims a
//! guild first within the TTL window gets to send the owner notification;
//! everyone else stays silent. Injected through the context so concurrent
//! delivery paths share one window per guild.

use std::time::{Duration, Instant};

use bump_core::Snowflake;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Time-windowed owner-notification claims
#[derive(Debug)]
pub struct SuppressionMap {
    ttl: Duration,
    claims: DashMap<Snowflake, Instant>,
}

impl SuppressionMap {
    /// Create a map holding each claim for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            claims: DashMap::new(),
        }
    }

    /// Try to claim the notification slot for a guild.
    ///
    /// Returns `true` when the caller holds the claim and may notify;
    /// `false` while an earlier claim is still inside the TTL window.
    /// Expired claims are evicted on every call, keeping the map bounded by
    /// the number of guilds that misbehaved within one window.
    pub fn claim(&self, guild_id: Snowflake) -> bool {
        self.claims.retain(|_, claimed| claimed.elapsed() < self.ttl);
        match self.claims.entry(guild_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                true
            }
        }
    }

    /// The configured claim window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of live claims
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claims are currently held
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl Default for SuppressionMap {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
