//! Distributed Coordination Library
//!
//! A small cluster of addressable nodes that exchange request/response calls over
//! HTTP and jointly run four classic coordination protocols. The binary
//! (`main.rs`) wires these modules into node and monitor processes.
//!
//! ## Architecture Modules
//!
//! - **`clock`**: Lamport logical clock rules.
//! - **`snapshot`**: Chandy-Lamport snapshot bookkeeping (recorded state, per-channel
//!   recording, marker tracking).
//! - **`election`**: Bully election state: the in-election guard and the coordinator watch.
//! - **`monitor`**: Heartbeat-based failure detector and its HTTP surface.
//! - **`node`**: The node service composing all protocols, its router, heartbeat loop and client.
//! - **`transport`**: The outbound call seam, over HTTP or in-process.
//! - **`membership`**: Node identities and the static peer table.
//! - **`config`**: YAML configuration.
//! - **`error`**: Errors surfaced to callers of node operations.

pub mod clock;
pub mod config;
pub mod election;
pub mod error;
pub mod membership;
pub mod monitor;
pub mod node;
pub mod snapshot;
pub mod transport;
