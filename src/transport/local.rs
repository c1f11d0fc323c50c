use super::{PeerTransport, TransportError};
use crate::error::NodeError;
use crate::membership::NodeId;
use crate::monitor::FailureDetector;
use crate::node::NodeService;
use crate::node::protocol::ReceiveMessageRequest;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::{Arc, Weak};

/// In-process transport.
///
/// Routes each call straight to the service registered under the target
/// address. Nodes are held weakly so a node and its transport do not keep
/// each other alive.
#[derive(Default)]
pub struct LocalTransport {
    nodes: DashMap<String, Weak<NodeService>>,
    monitors: DashMap<String, Arc<FailureDetector>>,
    down: DashSet<String>,
}

impl LocalTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register_node(&self, addr: impl Into<String>, node: &Arc<NodeService>) {
        self.nodes.insert(addr.into(), Arc::downgrade(node));
    }

    pub fn register_monitor(&self, addr: impl Into<String>, monitor: Arc<FailureDetector>) {
        self.monitors.insert(addr.into(), monitor);
    }

    /// Makes every call to `addr` fail as if the process had crashed.
    pub fn take_down(&self, addr: &str) {
        tracing::debug!("Local transport: {} is now down", addr);
        self.down.insert(addr.to_string());
    }

    pub fn bring_up(&self, addr: &str) {
        self.down.remove(addr);
    }

    fn node(&self, addr: &str) -> Result<Arc<NodeService>, TransportError> {
        if self.down.contains(addr) {
            return Err(TransportError::Unreachable(addr.to_string()));
        }

        self.nodes
            .get(addr)
            .and_then(|entry| entry.value().upgrade())
            .ok_or_else(|| TransportError::Unreachable(addr.to_string()))
    }

    fn monitor(&self, addr: &str) -> Result<Arc<FailureDetector>, TransportError> {
        if self.down.contains(addr) {
            return Err(TransportError::Unreachable(addr.to_string()));
        }

        self.monitors
            .get(addr)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::Unreachable(addr.to_string()))
    }
}

#[async_trait]
impl PeerTransport for LocalTransport {
    async fn deliver_message(
        &self,
        addr: &str,
        message: ReceiveMessageRequest,
    ) -> Result<u64, TransportError> {
        let node = self.node(addr)?;
        node.receive_message(message.timestamp, &message.message, message.sender)
            .await
            .map_err(|e| rejected(addr, &e))
    }

    async fn deliver_marker(&self, addr: &str, sender: NodeId) -> Result<i64, TransportError> {
        let node = self.node(addr)?;
        node.receive_marker(sender)
            .await
            .map_err(|e| rejected(addr, &e))
    }

    async fn deliver_app_message(
        &self,
        addr: &str,
        delta: i64,
        sender: NodeId,
    ) -> Result<i64, TransportError> {
        let node = self.node(addr)?;
        Ok(node.receive_app_message(delta, sender).await)
    }

    async fn request_election(
        &self,
        addr: &str,
        sender: NodeId,
    ) -> Result<String, TransportError> {
        let node = self.node(addr)?;
        Ok(node.receive_election(sender).await.to_string())
    }

    async fn announce_coordinator(
        &self,
        addr: &str,
        coordinator: NodeId,
    ) -> Result<(), TransportError> {
        let node = self.node(addr)?;
        node.announce_coordinator(coordinator);
        Ok(())
    }

    async fn send_heartbeat(&self, addr: &str, node_id: NodeId) -> Result<(), TransportError> {
        let monitor = self.monitor(addr)?;
        monitor.receive_heartbeat(node_id);
        Ok(())
    }
}

/// Maps a refusal by the target node to the status its HTTP surface would answer.
fn rejected(addr: &str, error: &NodeError) -> TransportError {
    TransportError::Status {
        addr: addr.to_string(),
        status: error.status_code().as_u16(),
    }
}
