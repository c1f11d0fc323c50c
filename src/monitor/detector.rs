use crate::membership::NodeId;

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
struct LastSeen {
    /// Monotonic, used for staleness.
    at: Instant,
    /// Wall clock, reported to callers.
    unix_ms: u64,
}

/// Heartbeat table owned by the monitor process.
///
/// Entries are created on a node's first heartbeat and only ever refreshed.
pub struct FailureDetector {
    heartbeats: DashMap<NodeId, LastSeen>,
    timeout: Duration,
}

impl FailureDetector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            heartbeats: DashMap::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn receive_heartbeat(&self, node_id: NodeId) {
        let seen = LastSeen {
            at: Instant::now(),
            unix_ms: now_ms(),
        };

        if self.heartbeats.insert(node_id, seen).is_none() {
            tracing::info!("First heartbeat from node {}", node_id);
        } else {
            tracing::debug!("Heartbeat from node {}", node_id);
        }
    }

    /// Nodes whose last heartbeat is older than the timeout, in id order.
    pub fn check_failures(&self) -> Vec<NodeId> {
        let now = Instant::now();

        let mut failed: Vec<NodeId> = self
            .heartbeats
            .iter()
            .filter(|entry| now.duration_since(entry.value().at) > self.timeout)
            .map(|entry| *entry.key())
            .collect();
        failed.sort();

        failed
    }

    /// Last heartbeat of every node ever seen, as unix milliseconds.
    pub fn status(&self) -> BTreeMap<NodeId, u64> {
        self.heartbeats
            .iter()
            .map(|entry| (*entry.key(), entry.value().unix_ms))
            .collect()
    }
}

impl Default for FailureDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_TIMEOUT)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
