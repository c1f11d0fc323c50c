//! Snapshot Module
//!
//! Chandy-Lamport consistent global snapshots.
//!
//! ## Protocol
//! 1. **Initiation**: A node captures its application value and sends a marker to every peer.
//! 2. **First Marker**: A node that has not captured yet does so on its first marker and
//!    forwards markers to every peer except the sender.
//! 3. **Channel Recording**: After the local capture, application messages from a peer
//!    are recorded until that peer's marker arrives.
//!
//! This module holds the state machine only. Marker delivery is done by the node.

pub mod record;
pub mod types;

pub use record::SnapshotRecord;
pub use types::{MarkerOutcome, SnapshotPhase, SnapshotStatus, SnapshotView};

#[cfg(test)]
mod tests;
