//! Node Module
//!
//! The addressable cluster member. A node embeds four protocols and keeps them
//! consistent under concurrent inbound calls:
//!
//! - **Lamport clock**: local events, timestamped sends and receives.
//! - **Chandy-Lamport snapshot**: marker propagation and channel recording
//!   over an integer application value.
//! - **Bully election**: election requests to higher peers, coordinator announcements,
//!   and the upward cascade started by every contacted node.
//! - **Heartbeats**: a background loop reporting liveness to the monitor.
//!
//! ## Submodules
//! - **`service`**: `NodeService`, the protocol logic and outbound fan-out.
//! - **`handlers`**: Axum handlers and the node router.
//! - **`protocol`**: Endpoints and DTOs.
//! - **`client`**: HTTP client used to drive nodes from outside.
//! - **`heartbeat`**: The periodic heartbeat task.

pub mod client;
pub mod handlers;
pub mod heartbeat;
pub mod protocol;
pub mod service;
pub mod types;

pub use handlers::router;
pub use service::NodeService;
pub use types::{BroadcastReport, NodeSettings, NodeStatus, SendReport};
