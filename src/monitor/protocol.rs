//! Monitor Network Protocol
//!
//! Endpoints and DTOs for the heartbeat monitor. Nodes only ever call
//! `ENDPOINT_HEARTBEAT`. The other two are diagnostics for operators.

use crate::membership::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ENDPOINT_HEARTBEAT: &str = "/heartbeat";
pub const ENDPOINT_FAILURES: &str = "/failures";
pub const ENDPOINT_MONITOR_STATUS: &str = "/status";

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub node_id: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub acknowledged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailuresResponse {
    pub failed: Vec<NodeId>,
}

/// Last heartbeat per node, in unix milliseconds.
#[derive(Debug, Serialize, Deserialize)]
pub struct MonitorStatusResponse {
    pub heartbeats: BTreeMap<NodeId, u64>,
}
