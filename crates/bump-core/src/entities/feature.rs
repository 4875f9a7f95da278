//! Capability tags - feature flags granted to guilds directly or via premium tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability a guild can hold, either granted directly or inherited from
/// an assigned premium tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Custom embed colour in the bump message
    Color,
    /// Banner image in the bump message
    Banner,
    /// Custom command prefix (consumed by command glue, stored here)
    Prefix,
    /// Listed prominently on the web directory (consumed by web glue)
    Featured,
    /// Cross-shard distribution: bumps fan out across the whole federation
    Cross,
    /// Feed channel may restrict public access without being disabled
    RestrictedChannel,
    /// Automatic bumping on a schedule
    Autobump,
    /// Marked as an official support guild
    SupportServer,
    /// Shortened bump cooldown
    Priority,
}

impl Feature {
    /// Canonical tag name, as stored and shown to guild admins
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "COLOR",
            Self::Banner => "BANNER",
            Self::Prefix => "PREFIX",
            Self::Featured => "FEATURED",
            Self::Cross => "CROSS",
            Self::RestrictedChannel => "RESTRICTED_CHANNEL",
            Self::Autobump => "AUTOBUMP",
            Self::SupportServer => "SUPPORT_SERVER",
            Self::Priority => "PRIORITY",
        }
    }

    /// Parse a stored tag name; unknown tags return `None` so records written
    /// by newer deployments still load
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COLOR" => Some(Self::Color),
            "BANNER" => Some(Self::Banner),
            "PREFIX" => Some(Self::Prefix),
            "FEATURED" => Some(Self::Featured),
            "CROSS" => Some(Self::Cross),
            "RESTRICTED_CHANNEL" => Some(Self::RestrictedChannel),
            "AUTOBUMP" => Some(Self::Autobump),
            "SUPPORT_SERVER" => Some(Self::SupportServer),
            "PRIORITY" => Some(Self::Priority),
            _ => None,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
