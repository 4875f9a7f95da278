//! Engine layer error types
//!
//! Wraps domain errors and adds the variants only the engine can produce:
//! cooldown rejections, the readiness gate, and dependency wiring problems.

use bump_core::DomainError;
use chrono::Duration;
use thiserror::Error;

/// Engine layer error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Domain rule violation or infrastructure fault, unchanged
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The guild's bump cooldown has not elapsed yet
    #[error("Guild is on cooldown for another {}s", .remaining.num_seconds())]
    OnCooldown { remaining: Duration },

    /// The readiness gate has not been released yet
    #[error("Engine is not ready to coordinate bumps")]
    NotReady,

    /// A dependency was wired up wrong (or not at all)
    #[error("Engine configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Get the error code for operator-facing surfaces
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::OnCooldown { .. } => "ON_COOLDOWN",
            Self::NotReady => "NOT_READY",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Check if this is a cooldown rejection
    pub fn is_cooldown(&self) -> bool {
        matches!(self, Self::OnCooldown { .. })
    }

    /// Check if this is an infrastructure fault that should propagate hard
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_fatal(),
            Self::Configuration(_) => true,
            Self::OnCooldown { .. } | Self::NotReady => false,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
