use crate::membership::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply a node gives to every election request.
pub const ELECTION_ACK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    Idle,
    Electing,
}

/// How a call to start an election ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionOutcome {
    /// No higher peer answered. This node declared itself coordinator.
    Elected(NodeId),
    /// A higher peer answered. Carries the coordinator known when the grace
    /// period ended, which may be stale or unset.
    Deferred(Option<NodeId>),
    /// A round was already running on this node.
    AlreadyInProgress,
}

impl ElectionOutcome {
    pub fn coordinator(&self) -> Option<NodeId> {
        match self {
            ElectionOutcome::Elected(id) => Some(*id),
            ElectionOutcome::Deferred(id) => *id,
            ElectionOutcome::AlreadyInProgress => None,
        }
    }
}

impl fmt::Display for ElectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElectionOutcome::Elected(id) | ElectionOutcome::Deferred(Some(id)) => {
                write!(f, "coordinator is node {}", id)
            }
            ElectionOutcome::Deferred(None) => f.write_str("coordinator is unknown"),
            ElectionOutcome::AlreadyInProgress => f.write_str("election already in progress"),
        }
    }
}
