//! Peer Transport Module
//!
//! The request/response seam between a node and the rest of the cluster. Every
//! outbound call a node makes (timestamped messages, markers, application
//! messages, election traffic, heartbeats) goes through [`PeerTransport`].
//!
//! ## Implementations
//! - **`http`**: JSON over HTTP with `reqwest`, every call bounded by a timeout.
//! - **`local`**: In-process routing table that calls the target service directly.
//!   Addresses can be taken down to simulate crashed processes.
//!
//! Calls are never retried here. Callers treat any error as "peer presumed unavailable".

pub mod http;
pub mod local;

pub use http::HttpTransport;
pub use local::LocalTransport;

use crate::membership::NodeId;
use crate::node::protocol::ReceiveMessageRequest;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, timed out, or the body could not be decoded.
    #[error("request to {addr} failed: {source}")]
    Http {
        addr: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{addr} answered with status {status}")]
    Status { addr: String, status: u16 },

    /// Nothing is listening at the address.
    #[error("{0} is unreachable")]
    Unreachable(String),
}

/// Outbound calls a node issues to peers and to the monitor.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Delivers a timestamped message. Returns the receiver's clock after the receive.
    async fn deliver_message(
        &self,
        addr: &str,
        message: ReceiveMessageRequest,
    ) -> Result<u64, TransportError>;

    /// Delivers a snapshot marker. Returns the receiver's recorded state.
    async fn deliver_marker(&self, addr: &str, sender: NodeId) -> Result<i64, TransportError>;

    /// Delivers an application message. Returns the receiver's new value.
    async fn deliver_app_message(
        &self,
        addr: &str,
        delta: i64,
        sender: NodeId,
    ) -> Result<i64, TransportError>;

    /// Sends an election request. Returns the raw reply.
    async fn request_election(&self, addr: &str, sender: NodeId)
    -> Result<String, TransportError>;

    async fn announce_coordinator(
        &self,
        addr: &str,
        coordinator: NodeId,
    ) -> Result<(), TransportError>;

    async fn send_heartbeat(&self, addr: &str, node_id: NodeId) -> Result<(), TransportError>;
}
