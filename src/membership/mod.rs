//! Membership Module
//!
//! Static cluster topology. Every node is created with its own identifier and a
//! fixed table mapping each peer identifier to the address it is reachable at.
//!
//! ## Core Concepts
//! - **Identity**: `NodeId` is a plain integer. Its ordering is also the Bully priority.
//! - **Peer Table**: Fixed at construction, excludes the local node, never mutated.

pub mod types;

pub use types::{NodeId, PeerTable};

#[cfg(test)]
mod tests;
