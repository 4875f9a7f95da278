//! Inbound listener - serve sibling shards' fanout requests.
//!
//! Subscribes to this shard's fanout channel, hands each decoded request to
//! the engine-side handler, and publishes the reached count back to the
//! requesting shard's reply channel. The connection is re-established after
//! errors with a fixed delay.

use std::sync::Arc;

use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::sync::mpsc;

use bump_core::traits::FanoutHandler;
use bump_core::value_objects::ShardTopology;

use crate::channels::RelayChannel;
use crate::config::RelayConfig;
use crate::pool::{RelayPool, RelayResult};
use crate::protocol::{FanoutEnvelope, ReplyEnvelope};

/// Commands for the listener task
#[derive(Debug)]
enum ListenerCommand {
    Shutdown,
}

/// Background task serving this shard's fanout channel
pub struct FanoutListener {
    control_tx: mpsc::Sender<ListenerCommand>,
}

impl FanoutListener {
    /// Spawn the listener loop for this shard
    pub fn spawn(
        config: RelayConfig,
        topology: ShardTopology,
        pool: RelayPool,
        handler: Arc<dyn FanoutHandler>,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::channel(4);
        tokio::spawn(listener_loop(config, topology, pool, handler, control_rx));
        Self { control_tx }
    }

    /// Stop the listener
    pub async fn shutdown(&self) {
        let _ = self.control_tx.send(ListenerCommand::Shutdown).await;
    }
}

async fn listener_loop(
    config: RelayConfig,
    topology: ShardTopology,
    pool: RelayPool,
    handler: Arc<dyn FanoutHandler>,
    mut control_rx: mpsc::Receiver<ListenerCommand>,
) {
    loop {
        match run_listener(&topology, &pool, &handler, &mut control_rx).await {
            Ok(true) => {
                tracing::info!("Fanout listener shutting down");
                break;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "Fanout listener error, reconnecting...");
                tokio::time::sleep(config.reconnect_delay).await;
            }
        }
    }
}

/// Run the listener until error or shutdown. Returns `true` on shutdown.
async fn run_listener(
    topology: &ShardTopology,
    pool: &RelayPool,
    handler: &Arc<dyn FanoutHandler>,
    control_rx: &mut mpsc::Receiver<ListenerCommand>,
) -> RelayResult<bool> {
    let client = redis::Client::open(pool.url())?;
    let mut pubsub = client.get_async_pubsub().await?;
    let channel = RelayChannel::fanout(topology.shard_id).name();
    pubsub.subscribe(&channel).await?;

    tracing::info!(channel = %channel, "Fanout listener connected");

    let mut stream = pubsub.on_message();

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(msg) => {
                        let payload: String = msg.get_payload().unwrap_or_default();
                        let envelope = match serde_json::from_str::<FanoutEnvelope>(&payload) {
                            Ok(envelope) => envelope,
                            Err(e) => {
                                tracing::warn!(error = %e, "Undecodable fanout envelope");
                                continue;
                            }
                        };
                        // Served off the stream so a slow fanout does not
                        // hold up the next request
                        serve(envelope, topology.shard_id, pool.clone(), handler.clone());
                    }
                    None => {
                        tracing::warn!("Fanout subscription ended");
                        return Ok(false);
                    }
                }
            }

            cmd = control_rx.recv() => {
                match cmd {
                    Some(ListenerCommand::Shutdown) | None => return Ok(true),
                }
            }
        }
    }
}

/// Run the handler and publish the reply in a detached task
fn serve(
    envelope: FanoutEnvelope,
    shard_id: u32,
    pool: RelayPool,
    handler: Arc<dyn FanoutHandler>,
) {
    tokio::spawn(async move {
        let reached = handler.handle_fanout(&envelope.request).await;
        let reply = ReplyEnvelope {
            request_id: envelope.request_id,
            shard_id,
            reached,
        };
        if let Err(e) = publish_reply(&pool, envelope.origin, &reply).await {
            tracing::error!(error = %e, origin = envelope.origin, "Failed to publish reply");
        }
    });
}

async fn publish_reply(pool: &RelayPool, origin: u32, reply: &ReplyEnvelope) -> RelayResult<()> {
    let payload = reply.to_json()?;
    let mut conn = pool.get().await?;
    let receivers: u32 = conn
        .publish(RelayChannel::reply(origin).name(), &payload)
        .await?;

    tracing::debug!(
        request_id = %reply.request_id,
        origin = origin,
        reached = reply.reached,
        receivers = receivers,
        "Reply published"
    );

    Ok(())
}
