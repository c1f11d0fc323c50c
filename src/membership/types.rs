use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a node in the cluster.
///
/// Ordering doubles as Bully priority: a higher id wins an election.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Static view of the other members of the cluster.
///
/// Built once when a node is constructed and never mutated afterwards.
/// The local node is never part of its own table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PeerTable {
    peers: BTreeMap<NodeId, String>,
}

impl PeerTable {
    /// Builds the table for `local`, dropping any entry that points back at it.
    pub fn new(local: NodeId, peers: impl IntoIterator<Item = (NodeId, String)>) -> Self {
        let peers = peers
            .into_iter()
            .filter(|(id, _)| *id != local)
            .collect();

        Self { peers }
    }

    pub fn address(&self, id: NodeId) -> Option<&str> {
        self.peers.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.peers.contains_key(&id)
    }

    /// Peers in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.peers.iter().map(|(id, addr)| (*id, addr.as_str()))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.peers.keys().copied()
    }

    /// Peers that outrank `id` in a Bully election.
    pub fn higher_than(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &str)> {
        self.iter().filter(move |(peer, _)| *peer > id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
