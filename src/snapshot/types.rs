use crate::membership::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle of the local snapshot.
///
/// `Complete` is not a separate phase: a `Recording` snapshot is complete once
/// every incoming channel has delivered its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotPhase {
    NotStarted,
    Recording,
}

/// Answer to a request to initiate a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    Started,
    /// A snapshot was already taken on this node. Nothing was re-recorded.
    AlreadyStarted,
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotStatus::Started => f.write_str("snapshot started"),
            SnapshotStatus::AlreadyStarted => f.write_str("snapshot already started"),
        }
    }
}

/// Result of processing an incoming marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerOutcome {
    /// This marker triggered the local recording. Markers must now be forwarded.
    pub first: bool,
    /// Value captured when the local recording happened.
    pub recorded_state: i64,
    /// Every incoming channel has now been closed by a marker.
    pub complete: bool,
}

/// Read-only projection of a node's snapshot. Partial while still recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub recorded_state: Option<i64>,
    pub channel_state: BTreeMap<NodeId, Vec<i64>>,
    pub complete: bool,
}
