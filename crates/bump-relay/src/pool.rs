//! Redis connection pool using deadpool-redis.
//!
//! The pool covers the publishing side only; pub/sub subscriptions use a
//! dedicated connection per listener (see `listener` and `transport`).

use deadpool_redis::{Config, Pool, Runtime};

/// Relay pool configuration
#[derive(Debug, Clone)]
pub struct RelayPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RelayPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&bump_common::RedisConfig> for RelayPoolConfig {
    fn from(config: &bump_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayPoolError>;

/// Managed Redis connection pool for the relay
#[derive(Clone)]
pub struct RelayPool {
    pool: Pool,
    url: String,
}

impl std::fmt::Debug for RelayPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RelayPool {
    /// Create a new Redis pool with the given configuration
    pub fn new(config: RelayPoolConfig) -> RelayResult<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| RelayPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RelayPoolError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Relay pool created"
        );

        Ok(Self {
            pool,
            url: config.url,
        })
    }

    /// Create a new Redis pool from bump-common config
    pub fn from_config(config: &bump_common::RedisConfig) -> RelayResult<Self> {
        Self::new(RelayPoolConfig::from(config))
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> RelayResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RelayPoolError::GetConnection)
    }

    /// Connection URL, for opening dedicated pub/sub connections
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current pool status
    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> RelayResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}
