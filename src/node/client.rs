//! Client for driving nodes and the monitor from outside the cluster.
//!
//! Used by the `demo` command and end-to-end tests to trigger local operations
//! (events, sends, snapshot initiation, elections) and read results back.

use super::protocol::*;
use super::types::NodeStatus;
use crate::membership::NodeId;
use crate::monitor::protocol::{
    ENDPOINT_FAILURES, ENDPOINT_MONITOR_STATUS, FailuresResponse, MonitorStatusResponse,
};
use crate::snapshot::SnapshotView;
use crate::transport::{HttpTransport, TransportError};

use serde_json::json;
use std::time::Duration;

/// Node operations need more headroom than a single peer call: an election
/// round includes the grace period, and a snapshot fans out across the mesh.
const HARNESS_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct NodeClient {
    addr: String,
    http: HttpTransport,
}

impl NodeClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            http: HttpTransport::new(HARNESS_TIMEOUT),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub async fn local_event(&self, description: &str) -> Result<u64, TransportError> {
        let request = LocalEventRequest {
            description: description.to_string(),
        };
        let response: ClockResponse = self
            .http
            .post(&self.addr, ENDPOINT_LOCAL_EVENT, &request)
            .await?;
        Ok(response.clock)
    }

    pub async fn send_message(
        &self,
        target: NodeId,
        message: &str,
    ) -> Result<SendMessageResponse, TransportError> {
        let request = SendMessageRequest {
            target,
            message: message.to_string(),
        };
        self.http
            .post(&self.addr, ENDPOINT_SEND_MESSAGE, &request)
            .await
    }

    pub async fn initiate_snapshot(&self) -> Result<InitiateSnapshotResponse, TransportError> {
        self.http
            .post(&self.addr, ENDPOINT_INITIATE_SNAPSHOT, &json!({}))
            .await
    }

    pub async fn get_snapshot(&self) -> Result<SnapshotView, TransportError> {
        self.http.get(&self.addr, ENDPOINT_GET_SNAPSHOT).await
    }

    pub async fn send_app_message(
        &self,
        target: NodeId,
        delta: i64,
    ) -> Result<SendAppResponse, TransportError> {
        self.http
            .post(&self.addr, ENDPOINT_SEND_APP, &SendAppRequest { target, delta })
            .await
    }

    pub async fn start_election(&self) -> Result<ElectionResultResponse, TransportError> {
        self.http
            .post(&self.addr, ENDPOINT_START_ELECTION, &json!({}))
            .await
    }

    pub async fn status(&self) -> Result<NodeStatus, TransportError> {
        self.http.get(&self.addr, ENDPOINT_NODE_STATUS).await
    }
}

#[derive(Clone)]
pub struct MonitorClient {
    addr: String,
    http: HttpTransport,
}

impl MonitorClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            http: HttpTransport::new(HARNESS_TIMEOUT),
        }
    }

    pub async fn check_failures(&self) -> Result<Vec<NodeId>, TransportError> {
        let response: FailuresResponse = self.http.get(&self.addr, ENDPOINT_FAILURES).await?;
        Ok(response.failed)
    }

    pub async fn status(&self) -> Result<MonitorStatusResponse, TransportError> {
        self.http.get(&self.addr, ENDPOINT_MONITOR_STATUS).await
    }
}
