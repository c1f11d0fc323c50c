//! Election Module
//!
//! Bully leader election. The reachable node with the highest identifier becomes coordinator.
//!
//! ## Protocol
//! - **Start**: A node sends an election request to every peer with a higher id.
//! - **Defer**: If any of them answers, it waits a grace period for the winner's announcement.
//! - **Win**: If none answers, it takes over and announces itself to every peer.
//! - **Cascade**: A node receiving a request always answers `OK` and starts its own round.
//!
//! Announcements are trusted as-is; nothing checks that the announcer is entitled to lead.

pub mod state;
pub mod types;

pub use state::{CoordinatorWatch, ElectionGuard, ElectionState};
pub use types::{ELECTION_ACK, ElectionOutcome, ElectionPhase};
