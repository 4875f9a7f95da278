//! Bump vocabulary - fanout policies, quota split, per-target outcomes

use serde::{Deserialize, Serialize};

use crate::entities::{Feature, Guild};
use crate::issues::ChannelIssue;
use crate::value_objects::Snowflake;

/// Fanout policy selecting the candidate destination set for one bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BumpKind {
    /// All hub guilds plus the source guild itself
    Hubs,
    /// Random sample of non-hub guilds up to the base quota, hubs as fallback
    Cross,
    /// Cross with the quota split evenly across sibling shards
    Distributed,
    /// Every eligible guild, no cap (administrative bumps)
    Full,
    /// No real candidates; test bump
    Sandbox,
}

impl BumpKind {
    /// Short lowercase label for logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hubs => "hubs",
            Self::Cross => "cross",
            Self::Distributed => "distributed",
            Self::Full => "full",
            Self::Sandbox => "sandbox",
        }
    }
}

/// The pair of policies one bump runs under: one for the initiating shard,
/// one broadcast to every sibling.
///
/// Sandbox guilds test against nothing on any shard. The cross capability
/// buys a federation-wide fanout: the full quota locally, the remainder
/// spread across siblings. Everything else reaches hubs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpPlan {
    pub local: BumpKind,
    pub siblings: BumpKind,
}

impl BumpPlan {
    /// Resolve the plan from a guild's configuration
    pub fn for_guild(guild: &Guild) -> Self {
        if guild.sandbox {
            Self {
                local: BumpKind::Sandbox,
                siblings: BumpKind::Sandbox,
            }
        } else if guild.has_capability(Feature::Cross) {
            Self {
                local: BumpKind::Cross,
                siblings: BumpKind::Distributed,
            }
        } else {
            Self {
                local: BumpKind::Hubs,
                siblings: BumpKind::Hubs,
            }
        }
    }
}

/// Per-sibling share of the base fanout quota for a `DISTRIBUTED` bump:
/// `base / (shard_count - 1)` rounded to nearest.
///
/// A standalone federation has no siblings to split with; the share then
/// falls back to the full base quota so the policy stays total.
pub fn distributed_share(base_quota: u32, shard_count: u32) -> u32 {
    if shard_count <= 1 {
        return base_quota;
    }
    let spread = f64::from(shard_count - 1);
    (f64::from(base_quota) / spread).round() as u32
}

/// Per-target delivery result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Message landed in the target's feed channel
    Delivered,
    /// Content-safety flags of source and target differ
    SkippedContentMismatch,
    /// Target is inside the failure-exclusion window (or just entered it)
    SkippedExcluded,
    /// Channel resolved but delivery is blocked by configuration
    FailedPermission(Vec<ChannelIssue>),
    /// Configured feed channel no longer exists
    FailedNotFound,
    /// Send rejected for an unknown, presumed transient reason
    FailedUnknown,
}

impl DeliveryOutcome {
    /// Whether this outcome counts towards the reached list
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Aggregated result of one shard-local fanout
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    /// Guilds whose feed received the message, in delivery order
    pub reached: Vec<Guild>,
    /// Every candidate's outcome, in selection order
    pub outcomes: Vec<(Snowflake, DeliveryOutcome)>,
}

impl DeliveryReport {
    /// Number of guilds reached
    pub fn reached_count(&self) -> usize {
        self.reached.len()
    }
}
