use crate::membership::NodeId;
use crate::transport::PeerTransport;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Reports liveness of `node_id` to the monitor every `interval`.
///
/// Runs until aborted. A failed heartbeat is logged and skipped; the next
/// attempt waits for the following tick.
pub async fn heartbeat_loop(
    node_id: NodeId,
    monitor: String,
    transport: Arc<dyn PeerTransport>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match transport.send_heartbeat(&monitor, node_id).await {
            Ok(()) => tracing::trace!("HB: node {} heartbeat sent", node_id),
            Err(e) => tracing::warn!("HB: node {} heartbeat failed: {}", node_id, e),
        }
    }
}
