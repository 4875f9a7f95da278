//! Rendered payloads - the bump message and owner-facing notices

use serde::{Deserialize, Serialize};

use crate::entities::{Feature, Guild};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// A bump message rendered once per coordination cycle and delivered
/// verbatim to every target, local and remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpMessage {
    /// Guild the message advertises
    pub source_id: Snowflake,
    /// Display title (the guild name)
    pub title: String,
    /// Promotional text
    pub body: String,
    /// Invite code receivers can join through
    pub invite: String,
    /// Embed colour; only rendered for guilds holding the colour capability
    pub color: Option<i32>,
    /// Banner image URL; only rendered with the banner capability
    pub banner: Option<String>,
}

impl BumpMessage {
    /// Render the message for a guild.
    ///
    /// Description and invite are required content; a guild missing either is
    /// not ready to bump and the error names every missing field. Colour and
    /// banner are dropped silently when the capability is absent.
    pub fn compose(guild: &Guild) -> Result<Self, DomainError> {
        let mut missing = Vec::new();
        if guild
            .description
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
        {
            missing.push("description".to_string());
        }
        if guild.invite.as_deref().is_none_or(|i| i.trim().is_empty()) {
            missing.push("invite".to_string());
        }
        if !missing.is_empty() {
            return Err(DomainError::GuildNotReady { missing });
        }

        Ok(Self {
            source_id: guild.id,
            title: guild.name.clone(),
            body: guild.description.clone().unwrap_or_default(),
            invite: guild.invite.clone().unwrap_or_default(),
            color: guild
                .has_capability(Feature::Color)
                .then_some(guild.color)
                .flatten(),
            banner: guild
                .has_capability(Feature::Banner)
                .then(|| guild.banner.clone())
                .flatten(),
        })
    }
}

/// A short plain notice, sent to guild owners (remediation instructions) or
/// into status channels (autobump results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
