//! Node Network Protocol
//!
//! Defines the API endpoints and DTOs of a node. The same endpoints serve the
//! driving harness (local triggers such as `ENDPOINT_SEND_MESSAGE`) and other
//! nodes (inbound protocol traffic such as `ENDPOINT_RECEIVE_MESSAGE`).
//!
//! All bodies are JSON.

use super::types::BroadcastReport;
use crate::membership::NodeId;
use serde::{Deserialize, Serialize};

// --- Lamport clock ---

/// Local event on the target node.
pub const ENDPOINT_LOCAL_EVENT: &str = "/clock/event";
/// Ask a node to send a timestamped message to one of its peers.
pub const ENDPOINT_SEND_MESSAGE: &str = "/clock/send";
/// Inbound timestamped message from a peer.
pub const ENDPOINT_RECEIVE_MESSAGE: &str = "/clock/receive";

// --- Snapshot ---

pub const ENDPOINT_INITIATE_SNAPSHOT: &str = "/snapshot/initiate";
/// Inbound marker from a peer.
pub const ENDPOINT_MARKER: &str = "/snapshot/marker";
pub const ENDPOINT_GET_SNAPSHOT: &str = "/snapshot";
/// Ask a node to send an application message to one of its peers.
pub const ENDPOINT_SEND_APP: &str = "/app/send";
/// Inbound application message from a peer.
pub const ENDPOINT_RECEIVE_APP: &str = "/app/receive";

// --- Election ---

pub const ENDPOINT_START_ELECTION: &str = "/election/start";
/// Inbound election request from a lower peer.
pub const ENDPOINT_ELECTION_REQUEST: &str = "/election/request";
/// Inbound coordinator announcement.
pub const ENDPOINT_COORDINATOR: &str = "/election/coordinator";

// --- Diagnostics ---

pub const ENDPOINT_NODE_STATUS: &str = "/status";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct LocalEventRequest {
    pub description: String,
}

/// Logical clock of the answering node after it handled the request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClockResponse {
    pub clock: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub target: NodeId,
    pub message: String,
}

/// Result of a send to a known peer. `error` is set when the peer could not be reached.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub clock: u64,
    pub delivered: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveMessageRequest {
    pub timestamp: u64,
    pub message: String,
    pub sender: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitiateSnapshotResponse {
    pub status: String,
    /// Peers the initiator reached with a marker. Empty when already started.
    pub markers: BroadcastReport,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkerRequest {
    pub sender: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkerResponse {
    pub recorded_state: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendAppRequest {
    pub target: NodeId,
    pub delta: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendAppResponse {
    pub value: i64,
    pub delivered: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiveAppRequest {
    pub delta: i64,
    pub sender: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValueResponse {
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionResultResponse {
    pub result: String,
    pub coordinator: Option<NodeId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionRequest {
    pub sender: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionReply {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoordinatorAnnouncement {
    pub coordinator: NodeId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
    pub acknowledged: bool,
}
