//! Chandy-Lamport Snapshot Record
//!
//! Holds the per-node half of a global snapshot: the application value captured
//! at the local cut, and for each incoming channel the messages that were in
//! flight across that cut.
//!
//! A channel records from the moment the local state is captured until the
//! marker from that channel's sender arrives. After that its contents are frozen.
//!
//! Only one snapshot is taken per node lifetime. A second initiation, or a
//! marker arriving after the local recording, never re-captures state.

use super::types::{MarkerOutcome, SnapshotPhase, SnapshotView};
use crate::membership::NodeId;

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    recorded_state: Option<i64>,
    channel_state: BTreeMap<NodeId, Vec<i64>>,
    markers_received: BTreeMap<NodeId, bool>,
}

impl SnapshotRecord {
    /// Creates an empty record with one incoming channel per peer.
    pub fn new(peers: impl IntoIterator<Item = NodeId>) -> Self {
        let mut channel_state = BTreeMap::new();
        let mut markers_received = BTreeMap::new();

        for peer in peers {
            channel_state.insert(peer, Vec::new());
            markers_received.insert(peer, false);
        }

        Self {
            recorded_state: None,
            channel_state,
            markers_received,
        }
    }

    pub fn phase(&self) -> SnapshotPhase {
        if self.recorded_state.is_some() {
            SnapshotPhase::Recording
        } else {
            SnapshotPhase::NotStarted
        }
    }

    /// Captures `current_value` as the local state.
    ///
    /// Returns `false` without touching anything if the state was already captured.
    pub fn begin(&mut self, current_value: i64) -> bool {
        if self.recorded_state.is_some() {
            return false;
        }

        self.recorded_state = Some(current_value);
        true
    }

    /// Closes the channel from `sender`, capturing local state first if this is
    /// the first marker seen.
    ///
    /// Returns `None` if `sender` has no channel into this node.
    pub fn on_marker(&mut self, sender: NodeId, current_value: i64) -> Option<MarkerOutcome> {
        if !self.markers_received.contains_key(&sender) {
            return None;
        }

        let first = self.begin(current_value);
        self.markers_received.insert(sender, true);

        Some(MarkerOutcome {
            first,
            recorded_state: self.recorded_state.unwrap_or(current_value),
            complete: self.is_complete(),
        })
    }

    /// Channel recording rule for an inbound application message.
    ///
    /// The payload belongs to the channel state when the local cut has been
    /// taken but the sender's marker has not arrived yet. Returns whether the
    /// message was recorded.
    pub fn record_message(&mut self, sender: NodeId, payload: i64) -> bool {
        if self.recorded_state.is_none() {
            return false;
        }

        match self.markers_received.get(&sender) {
            Some(false) => {
                self.channel_state.entry(sender).or_default().push(payload);
                true
            }
            _ => false,
        }
    }

    /// Local state captured and every incoming channel closed.
    pub fn is_complete(&self) -> bool {
        self.recorded_state.is_some() && self.markers_received.values().all(|received| *received)
    }

    pub fn view(&self) -> SnapshotView {
        SnapshotView {
            recorded_state: self.recorded_state,
            channel_state: self.channel_state.clone(),
            complete: self.is_complete(),
        }
    }
}
