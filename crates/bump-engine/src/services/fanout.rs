//! Fanout service
//!
//! The inbound half of cross-shard coordination: a sibling shard asks this
//! one to fan out locally for a source guild, and gets back the number of
//! guilds reached. Hooked into the transport listener as the
//! [`FanoutHandler`]. Every failure collapses to a count of zero; the
//! initiating shard treats us no differently from a timeout.

use async_trait::async_trait;
use bump_core::traits::{FanoutHandler, FanoutRequest};
use tracing::{debug, error, instrument};

use super::context::EngineContext;
use super::delivery::DeliveryExecutor;
use super::error::EngineResult;
use super::selector::TargetSelector;

/// Serves sibling shards' fanout requests against the local guild pool
pub struct FanoutService {
    ctx: EngineContext,
}

impl FanoutService {
    /// Create a new FanoutService
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    async fn serve(&self, request: &FanoutRequest) -> EngineResult<u64> {
        let Some(source) = self.ctx.guilds().find(request.source_id).await? else {
            debug!(source_id = %request.source_id, "Unknown source guild, nothing to fan out");
            return Ok(0);
        };

        let candidates = TargetSelector::new(&self.ctx)
            .select(request.kind, &source)
            .await?;
        let report = DeliveryExecutor::new(&self.ctx)
            .deliver(&source, candidates, &request.message)
            .await?;

        debug!(
            source_id = %request.source_id,
            kind = request.kind.as_str(),
            reached = report.reached_count(),
            "Sibling fanout served"
        );
        Ok(report.reached_count() as u64)
    }
}

#[async_trait]
impl FanoutHandler for FanoutService {
    async fn handle_fanout(&self, request: &FanoutRequest) -> u64 {
        // Serving needs the live session; before the gate opens every
        // candidate would look like a session gap and self-exclude.
        if !self.ctx.ready().is_ready() {
            debug!(source_id = %request.source_id, "Not ready, sibling request answered with zero");
            return 0;
        }
        match self.serve(request).await {
            Ok(reached) => reached,
            Err(err) => {
                error!(
                    source_id = %request.source_id,
                    error = %err,
                    "Sibling fanout failed"
                );
                0
            }
        }
    }
}
