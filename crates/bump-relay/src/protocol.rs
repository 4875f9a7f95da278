//! Wire envelopes for the shard relay.
//!
//! Requests and replies are correlated by a uuid: a shard discards any reply
//! that does not match the broadcast it is currently collecting for.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bump_core::traits::FanoutRequest;

/// A fanout request envelope as published to a sibling's fanout channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutEnvelope {
    /// Correlation id, echoed back in the reply
    pub request_id: Uuid,
    /// Shard the reply should be published to
    pub origin: u32,
    /// The request itself
    pub request: FanoutRequest,
}

impl FanoutEnvelope {
    /// Wrap a request for the wire
    #[must_use]
    pub fn new(origin: u32, request: FanoutRequest) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            origin,
            request,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A reply envelope as published to the requester's reply channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    /// Correlation id from the request envelope
    pub request_id: Uuid,
    /// Shard that served the request
    pub shard_id: u32,
    /// Number of guilds the serving shard reached
    pub reached: u64,
}

impl ReplyEnvelope {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
