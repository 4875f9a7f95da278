//! Notice texts
//!
//! The owner-facing and status-channel messages the engine sends. Kept in
//! one place so delivery remediation and the scheduler word things the same
//! way. Channel issues render through their own `Display` impls.

use bump_core::{ChannelIssue, Guild, Notice, Snowflake};

use super::error::EngineError;

/// Owner notice: the configured feed channel no longer exists
pub fn feed_missing(guild: &Guild) -> Notice {
    Notice::new(
        "Bump feed disabled",
        format!(
            "The feed channel configured for \"{}\" no longer exists, so \
             receiving bumps has been turned off. Set a new feed channel to \
             rejoin the rotation.",
            guild.name
        ),
    )
}

/// Owner notice: the feed channel exists but cannot receive bumps
pub fn feed_broken(guild: &Guild, issues: &[ChannelIssue]) -> Notice {
    Notice::new(
        "Bump feed disabled",
        format!(
            "The feed channel configured for \"{}\" cannot receive bumps:\n\
             {}\n\
             Receiving bumps has been turned off. Fix the channel and set it \
             again to rejoin the rotation.",
            guild.name,
            issue_lines(issues)
        ),
    )
}

/// Owner notice: the autobump status channel no longer exists
pub fn status_channel_missing(guild: &Guild) -> Notice {
    Notice::new(
        "Autobump status channel disabled",
        format!(
            "The autobump status channel configured for \"{}\" no longer \
             exists, so status updates have been turned off. Set a new \
             channel to keep receiving them.",
            guild.name
        ),
    )
}

/// Owner notice: the autobump status channel cannot receive messages
pub fn status_channel_broken(guild: &Guild, issues: &[ChannelIssue]) -> Notice {
    Notice::new(
        "Autobump status channel disabled",
        format!(
            "The autobump status channel configured for \"{}\" cannot \
             receive messages:\n\
             {}\n\
             Status updates have been turned off. Fix the channel and set it \
             again to keep receiving them.",
            guild.name,
            issue_lines(issues)
        ),
    )
}

/// Status-channel notice: an automatic bump went out
pub fn autobump_delivered(guild: &Guild, reached_locally: usize, external: u64) -> Notice {
    let total = reached_locally as u64 + external;
    Notice::new(
        "Autobump delivered",
        format!(
            "\"{}\" was bumped automatically and reached {} guilds \
             ({} on this shard, {} on sibling shards).",
            guild.name, total, reached_locally, external
        ),
    )
}

/// Status-channel notice: an automatic bump did not go through
pub fn autobump_failed(guild: &Guild, error: &EngineError) -> Notice {
    Notice::new(
        "Autobump failed",
        format!(
            "The automatic bump for \"{}\" did not go through: {error}",
            guild.name
        ),
    )
}

/// Reminder ping: the guild's cooldown has elapsed
pub fn bump_available(guild: &Guild, user_id: Snowflake) -> Notice {
    Notice::new(
        "Bump available",
        format!("<@{user_id}> \"{}\" can be bumped again.", guild.name),
    )
}

fn issue_lines(issues: &[ChannelIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
