//! Cooldown calculator - minimum inter-bump interval for a guild
//!
//! Pure over the guild's capability set and the acting user's vote status.
//! Vote status comes from an external oracle and may be stale between
//! evaluations; callers memoise it for at most one loop pass.

use chrono::Duration;

use crate::entities::{Feature, Guild};

/// Base interval between bumps, in minutes
pub const BASE_MINUTES: i64 = 60;

/// Interval for guilds holding the priority capability, in minutes
pub const PRIORITY_MINUTES: i64 = 30;

/// Minimum interval before the guild may bump again.
///
/// The priority capability lowers the base; a recent vote by the acting user
/// shaves a further quarter off manual bumps. The automated actor cannot
/// vote, so the autobump path never applies the vote discount.
pub fn bump_cooldown(guild: &Guild, is_autobump: bool, has_voted: bool) -> Duration {
    let minutes = if guild.has_capability(Feature::Priority) {
        PRIORITY_MINUTES
    } else {
        BASE_MINUTES
    };
    let mut seconds = minutes * 60;
    if has_voted && !is_autobump {
        seconds = seconds * 3 / 4;
    }
    Duration::seconds(seconds)
}
