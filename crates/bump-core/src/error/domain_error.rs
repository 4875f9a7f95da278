//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Guild not ready to bump: missing {}", .missing.join(", "))]
    GuildNotReady { missing: Vec<String> },

    #[error("Guild is blocked: {0}")]
    GuildBlocked(Snowflake),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for operator-facing surfaces
    pub fn code(&self) -> &'static str {
        match self {
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::GuildNotReady { .. } => "GUILD_NOT_READY",
            Self::GuildBlocked(_) => "GUILD_BLOCKED",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GuildNotFound(_))
    }

    /// Check if this is a guild-configuration error the initiating actor
    /// should fix (as opposed to an operational fault)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::GuildNotReady { .. } | Self::GuildBlocked(_))
    }

    /// Check if this is an infrastructure fault that should propagate hard
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::TransportError(_) | Self::InternalError(_)
        )
    }
}
