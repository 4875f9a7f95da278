//! Outbound broadcast - ask every sibling shard to fan out locally.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tracing::instrument;

use bump_core::traits::{FanoutRequest, ShardReply, ShardTransport};
use bump_core::value_objects::ShardTopology;

use crate::channels::RelayChannel;
use crate::config::RelayConfig;
use crate::pool::{RelayPool, RelayResult};
use crate::protocol::{FanoutEnvelope, ReplyEnvelope};

/// Redis pub/sub implementation of ShardTransport
pub struct RedisShardTransport {
    pool: RelayPool,
    client: redis::Client,
    topology: ShardTopology,
    config: RelayConfig,
}

impl RedisShardTransport {
    /// Create a transport for the given shard position
    pub fn new(pool: RelayPool, topology: ShardTopology, config: RelayConfig) -> RelayResult<Self> {
        let client = redis::Client::open(pool.url())?;
        Ok(Self {
            pool,
            client,
            topology,
            config,
        })
    }

    /// Publish the request to every sibling and gather replies until the
    /// deadline. Returns the reached counts keyed by shard id; siblings
    /// missing from the map never answered.
    async fn collect_replies(&self, request: &FanoutRequest) -> RelayResult<HashMap<u32, u64>> {
        // Subscribe before publishing so no reply can slip past
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub
            .subscribe(RelayChannel::reply(self.topology.shard_id).name())
            .await?;

        let envelope = FanoutEnvelope::new(self.topology.shard_id, request.clone());
        let payload = envelope.to_json()?;

        let mut conn = self.pool.get().await?;
        let mut listeners = 0u32;
        for sibling in self.topology.siblings() {
            let receivers: u32 = conn
                .publish(RelayChannel::fanout(sibling).name(), &payload)
                .await?;
            listeners += receivers;
        }
        tracing::debug!(
            request_id = %envelope.request_id,
            siblings = self.topology.sibling_count(),
            listeners = listeners,
            "Fanout request published"
        );

        let expected = self.topology.sibling_count() as usize;
        let deadline = Instant::now() + self.config.reply_timeout;
        let mut reached = HashMap::with_capacity(expected);

        let mut stream = pubsub.on_message();
        while reached.len() < expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let Ok(next) = tokio::time::timeout(remaining, stream.next()).await else {
                break;
            };
            let Some(msg) = next else {
                tracing::warn!("Reply subscription ended early");
                break;
            };

            let payload: String = msg.get_payload().unwrap_or_default();
            match serde_json::from_str::<ReplyEnvelope>(&payload) {
                Ok(reply) if reply.request_id == envelope.request_id => {
                    reached.insert(reply.shard_id, reply.reached);
                }
                Ok(stale) => {
                    tracing::trace!(request_id = %stale.request_id, "Discarding stale reply");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Undecodable reply envelope");
                }
            }
        }

        Ok(reached)
    }
}

#[async_trait]
impl ShardTransport for RedisShardTransport {
    #[instrument(skip(self, request), fields(source_id = %request.source_id, kind = ?request.kind))]
    async fn broadcast(&self, request: &FanoutRequest) -> Vec<ShardReply> {
        if self.topology.sibling_count() == 0 {
            return Vec::new();
        }

        let reached = match self.collect_replies(request).await {
            Ok(reached) => reached,
            Err(e) => {
                tracing::error!(error = %e, "Broadcast failed, treating all siblings as silent");
                HashMap::new()
            }
        };

        self.topology
            .siblings()
            .map(|shard_id| ShardReply {
                shard_id,
                reached: reached.get(&shard_id).copied(),
            })
            .collect()
    }
}
