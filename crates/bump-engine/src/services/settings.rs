//! Engine tuning knobs
//!
//! One flat struct carried by the context so every service reads the same
//! numbers. Converted from the environment-facing [`BumpConfig`] by the host.

use std::time::Duration;

use bump_common::BumpConfig;
use chrono::{DateTime, Utc};

/// How long a failed guild stays out of candidate pools, in hours
pub const FAILED_EXCLUSION_HOURS: i64 = 24;

/// The `last_failed_at` cutoff for candidate eligibility at `now`: guilds
/// that failed after this instant are excluded.
pub fn failed_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - chrono::Duration::hours(FAILED_EXCLUSION_HOURS)
}

/// Engine tuning values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Shard-local candidate quota for sampled fanouts, before hub fallback
    pub base_quota: u32,
    /// Interval between autobump and reminder passes
    pub tick_interval: Duration,
    /// How long one owner-notification claim suppresses the next
    pub suppression_ttl: Duration,
    /// Idle time a sandboxed bump takes to mimic real delivery
    pub sandbox_settle: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_quota: 50,
            tick_interval: Duration::from_secs(30),
            suppression_ttl: Duration::from_secs(30),
            sandbox_settle: Duration::from_secs(10),
        }
    }
}

impl From<&BumpConfig> for EngineSettings {
    fn from(config: &BumpConfig) -> Self {
        Self {
            base_quota: config.base_quota,
            tick_interval: Duration::from_secs(config.autobump_interval_secs),
            suppression_ttl: Duration::from_secs(config.suppression_ttl_secs),
            sandbox_settle: Duration::from_secs(config.sandbox_settle_secs),
        }
    }
}
