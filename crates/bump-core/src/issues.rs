//! Channel issue evaluation - why a bump cannot land in a channel
//!
//! Pure functions over session data; the delivery executor fetches the
//! inputs and acts on the verdict (disable the channel, notify the owner).

use std::fmt;

use crate::entities::{Feature, Guild};
use crate::traits::{ChannelInfo, RoleOverwrite};
use crate::value_objects::Permissions;

/// One reason delivery to a channel is blocked, worded so it can be shown to
/// the guild owner as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIssue {
    /// Bot lacks a permission required for delivery
    MissingBotPermission(Permissions),
    /// Guild is flagged adult but the channel is not marked age-restricted
    NotMarkedNsfw,
    /// The `@everyone` overwrite does not explicitly retain a baseline
    /// permission
    EveryoneMissing(Permissions),
    /// Another role's overwrite denies a baseline permission
    RoleDenies {
        role_id: crate::value_objects::Snowflake,
        permission: Permissions,
    },
}

impl fmt::Display for ChannelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBotPermission(p) => {
                write!(f, "grant the bot the {} permission", p.list().join(", "))
            }
            Self::NotMarkedNsfw => {
                write!(f, "mark the feed channel as NSFW (this guild is age-flagged)")
            }
            Self::EveryoneMissing(p) => {
                write!(f, "allow @everyone the {} permission", p.list().join(", "))
            }
            Self::RoleDenies {
                role_id,
                permission,
            } => write!(
                f,
                "role {role_id} must not deny the {} permission",
                permission.list().join(", ")
            ),
        }
    }
}

/// Permissions the bot itself needs in any channel it posts to, checked one
/// flag at a time so every gap becomes its own remediation line
const REQUIRED_BOT_FLAGS: [Permissions; 4] = [
    Permissions::SEND_MESSAGES,
    Permissions::VIEW_CHANNEL,
    Permissions::EMBED_LINKS,
    Permissions::USE_EXTERNAL_EMOJIS,
];

/// Everything blocking bump delivery into a candidate's feed channel.
///
/// Beyond the bot's own permissions, the feed must be publicly readable:
/// the `@everyone` overwrite (when present) has to explicitly retain view
/// and history access and no other role overwrite may deny them. Guilds
/// holding [`Feature::RestrictedChannel`] opt out of the overwrite rules.
pub fn feed_channel_issues(
    channel: &ChannelInfo,
    bot_permissions: Permissions,
    overwrites: &[RoleOverwrite],
    candidate: &Guild,
) -> Vec<ChannelIssue> {
    let mut issues = Vec::new();

    for flag in REQUIRED_BOT_FLAGS {
        if !bot_permissions.has(flag) {
            issues.push(ChannelIssue::MissingBotPermission(flag));
        }
    }

    if candidate.nsfw && !channel.nsfw {
        issues.push(ChannelIssue::NotMarkedNsfw);
    }

    if !candidate.has_capability(Feature::RestrictedChannel) {
        for overwrite in overwrites {
            if overwrite.everyone {
                for flag in [Permissions::VIEW_CHANNEL, Permissions::READ_MESSAGE_HISTORY] {
                    if !overwrite.allow.contains(flag) {
                        issues.push(ChannelIssue::EveryoneMissing(flag));
                    }
                }
            } else {
                for flag in [Permissions::VIEW_CHANNEL, Permissions::READ_MESSAGE_HISTORY] {
                    if overwrite.deny.contains(flag) {
                        issues.push(ChannelIssue::RoleDenies {
                            role_id: overwrite.role_id,
                            permission: flag,
                        });
                    }
                }
            }
        }
    }

    issues
}

/// Everything blocking a status message into the autobump notification
/// channel. Only the bot's own permissions matter here.
pub fn notice_channel_issues(bot_permissions: Permissions) -> Vec<ChannelIssue> {
    REQUIRED_BOT_FLAGS
        .into_iter()
        .filter(|flag| !bot_permissions.has(*flag))
        .map(ChannelIssue::MissingBotPermission)
        .collect()
}
