//! Application configuration structs
//!
//! Loads configuration from environment variables.

use bump_core::ShardTopology;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub shard: ShardConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub bump: BumpConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Shard assignment for this process
#[derive(Debug, Clone, Deserialize)]
pub struct ShardConfig {
    #[serde(default)]
    pub shard_id: u32,
    #[serde(default = "default_shard_count")]
    pub shard_count: u32,
}

impl ShardConfig {
    /// The topology this process participates in
    #[must_use]
    pub fn topology(&self) -> ShardTopology {
        ShardTopology::new(self.shard_id, self.shard_count)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Bump engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct BumpConfig {
    /// Per-shard candidate quota before hub padding
    #[serde(default = "default_base_quota")]
    pub base_quota: u32,
    /// Seconds between automated bump passes
    #[serde(default = "default_autobump_interval")]
    pub autobump_interval_secs: u64,
    /// Seconds an owner notification claim stays held
    #[serde(default = "default_suppression_ttl")]
    pub suppression_ttl_secs: u64,
    /// Seconds a sandboxed run idles to mimic real delivery
    #[serde(default = "default_sandbox_settle")]
    pub sandbox_settle_secs: u64,
    /// Seconds to wait for sibling shard replies
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,
}

// Default value functions
fn default_app_name() -> String {
    "bump-engine".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_shard_count() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_base_quota() -> u32 {
    50
}

fn default_autobump_interval() -> u64 {
    30
}

fn default_suppression_ttl() -> u64 {
    30
}

fn default_sandbox_settle() -> u64 {
    10
}

fn default_reply_timeout() -> u64 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    /// or the shard assignment is inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let shard = ShardConfig {
            shard_id: env::var("SHARD_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            shard_count: env::var("SHARD_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_shard_count),
        };
        if shard.shard_count == 0 {
            return Err(ConfigError::InvalidValue(
                "SHARD_COUNT",
                "must be at least 1".to_string(),
            ));
        }
        if shard.shard_id >= shard.shard_count {
            return Err(ConfigError::InvalidValue(
                "SHARD_ID",
                format!("{} is outside 0..{}", shard.shard_id, shard.shard_count),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            shard,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: env::var("REDIS_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_redis_max_connections),
            },
            bump: BumpConfig {
                base_quota: env::var("BUMP_BASE_QUOTA")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_base_quota),
                autobump_interval_secs: env::var("AUTOBUMP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_autobump_interval),
                suppression_ttl_secs: env::var("NOTICE_SUPPRESSION_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_suppression_ttl),
                sandbox_settle_secs: env::var("SANDBOX_SETTLE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_sandbox_settle),
                reply_timeout_secs: env::var("FANOUT_REPLY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reply_timeout),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
