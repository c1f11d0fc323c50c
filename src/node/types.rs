use crate::membership::{NodeId, PeerTable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_ELECTION_GRACE: Duration = Duration::from_secs(3);

/// Everything a node needs at construction time.
#[derive(Debug, Clone)]
pub struct NodeSettings {
    pub id: NodeId,
    pub peers: PeerTable,
    /// Address of the heartbeat monitor. No heartbeats are emitted when unset.
    pub monitor: Option<String>,
    pub heartbeat_interval: Duration,
    /// How long a deferring election round waits for the winner's announcement.
    pub election_grace: Duration,
}

impl NodeSettings {
    pub fn new(id: NodeId, peers: PeerTable) -> Self {
        Self {
            id,
            peers,
            monitor: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            election_grace: DEFAULT_ELECTION_GRACE,
        }
    }

    pub fn with_monitor(mut self, monitor: impl Into<String>) -> Self {
        self.monitor = Some(monitor.into());
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_election_grace(mut self, grace: Duration) -> Self {
        self.election_grace = grace;
        self
    }
}

/// Outcome of a point-to-point send to a known peer.
///
/// `local` is the sender's own value after the send: the logical clock for
/// timestamped messages, the application value for application messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport<T> {
    pub local: T,
    /// Set when the peer could not be reached. The send is not retried.
    pub error: Option<String>,
}

impl<T> SendReport<T> {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-peer outcome of a best-effort fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReport {
    pub delivered: Vec<NodeId>,
    pub failed: Vec<NodeId>,
}

impl BroadcastReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Diagnostic view of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node_id: NodeId,
    pub clock: u64,
    pub value: i64,
    pub coordinator: Option<NodeId>,
    pub in_election: bool,
    pub snapshot_complete: bool,
}
